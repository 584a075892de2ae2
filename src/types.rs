//! Core types and structures for facade flatness inspection

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Orientation of a candidate grid-dividing line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// Line of constant x (separates pane columns)
    Vertical,
    /// Line of constant y (separates pane rows)
    Horizontal,
}

/// Side of a pane, seen from the pane itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Traversal order used when emitting pair comparisons
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// The side of the neighbouring pane that faces this side
    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Axis along which a range on this edge runs.
    ///
    /// Top and bottom edges carry horizontal (x) spans, left and right edges
    /// carry vertical (y) spans.
    pub fn span_axis(self) -> Axis {
        match self {
            Direction::Up | Direction::Down => Axis::Horizontal,
            Direction::Left | Direction::Right => Axis::Vertical,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Axis-aligned box in absolute facade image coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PaneRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PaneRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Translate a box expressed relative to `(origin_x, origin_y)` into absolute coordinates
    pub fn offset_by(&self, origin_x: u32, origin_y: u32) -> Self {
        Self {
            x: self.x + origin_x,
            y: self.y + origin_y,
            ..*self
        }
    }

    /// Coordinate where spans along `axis` start (x for horizontal spans, y for vertical ones)
    pub fn origin_along(&self, axis: Axis) -> i64 {
        match axis {
            Axis::Horizontal => self.x as i64,
            Axis::Vertical => self.y as i64,
        }
    }

    pub fn center(&self) -> (u32, u32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Four optional neighbour slots of a pane in the rectangular grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Adjacency {
    pub up: Option<usize>,
    pub down: Option<usize>,
    pub left: Option<usize>,
    pub right: Option<usize>,
}

impl Adjacency {
    pub fn get(&self, direction: Direction) -> Option<usize> {
        match direction {
            Direction::Up => self.up,
            Direction::Down => self.down,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    pub fn set(&mut self, direction: Direction, neighbor: Option<usize>) {
        let slot = match direction {
            Direction::Up => &mut self.up,
            Direction::Down => &mut self.down,
            Direction::Left => &mut self.left,
            Direction::Right => &mut self.right,
        };
        *slot = neighbor;
    }

    /// Present neighbours in `Direction::ALL` order
    pub fn neighbors(&self) -> impl Iterator<Item = (Direction, usize)> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(move |d| self.get(d).map(|idx| (d, idx)))
    }
}

/// Outcome of comparing one adjacent pane pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Index of the pane that initiated the comparison (always the smaller index)
    pub pane_a: usize,
    /// Index of the neighbouring pane
    pub pane_b: usize,
    /// Side of `pane_a` facing `pane_b`
    pub direction: Direction,
    pub is_match: bool,
}

/// Edge comparison strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMethod {
    /// Glass/reflection classification sampled along facing pixel lines
    #[default]
    Chroma,
    /// Reflection ranges touching the facing edges
    Contours,
}

impl FromStr for MatchMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chroma" => Ok(MatchMethod::Chroma),
            "contours" | "contour" => Ok(MatchMethod::Contours),
            other => Err(format!(
                "unknown match method '{}', expected 'chroma' or 'contours'",
                other
            )),
        }
    }
}

impl fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchMethod::Chroma => f.write_str("chroma"),
            MatchMethod::Contours => f.write_str("contours"),
        }
    }
}

/// Grid line detection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineConfig {
    /// Canny low hysteresis threshold
    pub canny_low: f32,
    /// Canny high hysteresis threshold
    pub canny_high: f32,
    /// Minimum segment length along the line direction (pixels)
    pub min_length: u32,
    /// Largest run of missing edge pixels bridged inside one segment
    pub max_gap: u32,
    /// Segments drifting this far (or more) across the line direction are rejected
    pub max_deviation: u32,
    /// Minimum spacing between kept vertical lines (pane columns are wide)
    pub vertical_min_separation: u32,
    /// Minimum spacing between kept horizontal lines
    pub horizontal_min_separation: u32,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            canny_low: 50.0,
            canny_high: 150.0,
            min_length: 100,
            max_gap: 5,
            max_deviation: 10,
            vertical_min_separation: 1800,
            horizontal_min_separation: 500,
        }
    }
}

impl LineConfig {
    pub fn min_separation(&self, axis: Axis) -> u32 {
        match axis {
            Axis::Vertical => self.vertical_min_separation,
            Axis::Horizontal => self.horizontal_min_separation,
        }
    }
}

/// Pane frame margins, as fractions of the pane's own size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Removed from top and bottom, fraction of pane height
    pub vertical_margin: f64,
    /// Removed from left and right, fraction of pane width
    pub horizontal_margin: f64,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            vertical_margin: 0.11,
            horizontal_margin: 0.06,
        }
    }
}

/// Chroma-sampling comparison configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChromaConfig {
    /// Inward distance of the sampled line from the shared boundary
    pub offset: u32,
    /// Number of points sampled on each line
    pub sample_points: usize,
    /// Chroma below this value is classified as bare glass
    pub chroma_threshold: f64,
    /// Agreement ratio that must be strictly exceeded for a match
    pub agreement_ratio: f64,
}

impl Default for ChromaConfig {
    fn default() -> Self {
        Self {
            offset: 30,
            sample_points: 100,
            chroma_threshold: 0.5,
            agreement_ratio: 0.9,
        }
    }
}

/// Contour-range comparison configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContourConfig {
    /// Allowed absolute difference between range endpoints (pixels, exclusive)
    pub tolerance: u32,
    /// Distance inside the pane edge at which reflection runs are scanned
    pub edge_inset: u32,
    /// Shorter reflection runs are treated as noise
    pub min_run: u32,
    /// Chroma at or above this value counts as reflected scenery
    pub chroma_threshold: f64,
}

impl Default for ContourConfig {
    fn default() -> Self {
        Self {
            tolerance: 20,
            edge_inset: 2,
            min_run: 3,
            chroma_threshold: 0.5,
        }
    }
}

/// Visual audit overlay settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationConfig {
    /// RGB color of pane rectangles and labels
    pub color: [u8; 3],
    /// Rectangle stroke width
    pub thickness: u32,
    /// Height of the index label glyphs
    pub label_height: u32,
    /// Radius of drawn sample points
    pub point_radius: u32,
    /// Draw chroma sample points
    pub draw_samples: bool,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            color: [100, 255, 255],
            thickness: 16,
            label_height: 120,
            point_radius: 6,
            draw_samples: true,
        }
    }
}

/// External structural-border segmentation process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorderSegmentationConfig {
    /// Executable to run
    pub program: PathBuf,
    /// Arguments placed before the generated ones (e.g. an inference script path)
    #[serde(default)]
    pub args: Vec<String>,
    /// Model deployment configuration passed with `--config`
    pub config_file: PathBuf,
    /// Directory the process writes its mask into
    #[serde(default = "default_border_save_dir")]
    pub save_dir: PathBuf,
}

fn default_border_save_dir() -> PathBuf {
    PathBuf::from("output")
}

/// Full inspection configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectionConfig {
    pub method: MatchMethod,
    pub lines: LineConfig,
    pub frame: FrameConfig,
    pub chroma: ChromaConfig,
    pub contours: ContourConfig,
    pub annotation: AnnotationConfig,
    /// Border segmentation collaborator; skipped when absent
    pub border: Option<BorderSegmentationConfig>,
    /// Skip reflection extraction and border compositing
    pub skip_preprocess: bool,
    /// Log per-stage timings
    pub benchmark: bool,
}

impl InspectionConfig {
    /// Load a JSON configuration file; missing fields take their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let config: InspectionConfig = serde_json::from_str(&data).map_err(|e| {
            Error::Config(format!("failed to parse {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no inspection can run with
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("canny_low", f64::from(self.lines.canny_low)),
            ("canny_high", f64::from(self.lines.canny_high)),
            ("chroma.chroma_threshold", self.chroma.chroma_threshold),
            ("contours.chroma_threshold", self.contours.chroma_threshold),
        ] {
            if !value.is_finite() {
                return Err(Error::Config(format!(
                    "{} must be a finite number, got {}",
                    name, value
                )));
            }
        }

        let lines = &self.lines;
        if lines.canny_low < 0.0 || lines.canny_low > lines.canny_high {
            return Err(Error::Config(format!(
                "canny thresholds must satisfy 0 <= low <= high, got {} / {}",
                lines.canny_low, lines.canny_high
            )));
        }
        if lines.min_length == 0 {
            return Err(Error::Config("min_length must be positive".to_string()));
        }
        for (name, margin) in [
            ("vertical_margin", self.frame.vertical_margin),
            ("horizontal_margin", self.frame.horizontal_margin),
        ] {
            if !(0.0..0.5).contains(&margin) {
                return Err(Error::Config(format!(
                    "{} must be in [0, 0.5), got {}",
                    name, margin
                )));
            }
        }
        if self.chroma.sample_points == 0 {
            return Err(Error::Config("sample_points must be positive".to_string()));
        }
        if self.chroma.chroma_threshold < 0.0 || self.contours.chroma_threshold < 0.0 {
            return Err(Error::Config(
                "chroma thresholds must be non-negative".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.chroma.agreement_ratio) {
            return Err(Error::Config(format!(
                "agreement_ratio must be in [0, 1], got {}",
                self.chroma.agreement_ratio
            )));
        }
        Ok(())
    }
}

/// Facade inspection error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Unreadable input: {0}")]
    UnreadableInput(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Processing error: {0}")]
    Processing(String),
}

pub type Result<T> = std::result::Result<T, Error>;
