//! Cross-pane reflection edge comparison
//!
//! Two interchangeable strategies decide whether the facing edges of two
//! adjacent, frame-stripped panes carry consistent reflected scenery:
//!
//! - [`chroma`]: classify sampled pixels on the facing lines as glass or
//!   reflection and require near point-for-point agreement.
//! - [`contours`]: compare the ranges where reflected regions touch the
//!   facing edges, in absolute image coordinates.
//!
//! Both are pure functions of their inputs, so pairs can be evaluated in any
//! order or in parallel.

pub mod chroma;
pub mod contours;
pub mod reflection;

pub use chroma::{match_by_chroma, ChromaComparison};
pub use contours::{match_by_contours, ReflectionEdges, Span};
pub use reflection::{BoundaryRunExtractor, EdgeExtractor};

use crate::types::{ChromaConfig, ContourConfig, Direction, PaneRect};
use image::{Rgb, RgbImage};
use rayon::prelude::*;

/// Color-saturation proxy: norm of the pairwise channel differences.
///
/// Zero for achromatic pixels, growing with saturation.
pub fn chroma(pixel: &Rgb<u8>) -> f64 {
    let [r, g, b] = pixel.0.map(f64::from);
    ((r - g).powi(2) + (g - b).powi(2) + (b - r).powi(2)).sqrt()
}

/// Pixels at or above `threshold` chroma count as reflected scenery
pub fn is_reflection(pixel: &Rgb<u8>, threshold: f64) -> bool {
    chroma(pixel) >= threshold
}

/// Pixel line inside a `width` x `height` pane, `offset` pixels in from `side`.
///
/// Top and bottom lines run left to right, left and right lines run top to
/// bottom. The offset is clamped so the line stays inside the pane.
pub fn facing_line(width: u32, height: u32, side: Direction, offset: u32) -> Vec<(u32, u32)> {
    if width == 0 || height == 0 {
        return Vec::new();
    }
    let inset_y = offset.min(height - 1);
    let inset_x = offset.min(width - 1);
    match side {
        Direction::Up => (0..width).map(|x| (x, inset_y)).collect(),
        Direction::Down => (0..width).map(|x| (x, height - 1 - inset_y)).collect(),
        Direction::Left => (0..height).map(|y| (inset_x, y)).collect(),
        Direction::Right => (0..height).map(|y| (width - 1 - inset_x, y)).collect(),
    }
}

/// A frame-stripped pane with its absolute box in the facade image
#[derive(Debug, Clone)]
pub struct StrippedPane {
    pub index: usize,
    pub rect: PaneRect,
    pub image: RgbImage,
}

/// Sampled points used by a comparison, in pane-local coordinates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeSamples {
    pub points_a: Vec<(u32, u32)>,
    pub points_b: Vec<(u32, u32)>,
}

/// Verdict of one pair comparison
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairOutcome {
    pub is_match: bool,
    /// Present for strategies that sample pixels
    pub samples: Option<EdgeSamples>,
}

/// Decides whether the edges of `a` and `b` facing each other are consistent.
///
/// `direction` is the side of `a` that faces `b`.
pub trait EdgeMatcher: Sync {
    fn compare(&self, a: &StrippedPane, b: &StrippedPane, direction: Direction) -> PairOutcome;
}

/// Chroma-sampling strategy
#[derive(Debug, Clone, Default)]
pub struct ChromaMatcher {
    pub config: ChromaConfig,
}

impl ChromaMatcher {
    pub fn new(config: ChromaConfig) -> Self {
        Self { config }
    }
}

impl EdgeMatcher for ChromaMatcher {
    fn compare(&self, a: &StrippedPane, b: &StrippedPane, direction: Direction) -> PairOutcome {
        let comparison = match_by_chroma(&a.image, &b.image, direction, &self.config);
        PairOutcome {
            is_match: comparison.is_match,
            samples: Some(EdgeSamples {
                points_a: comparison.sampled_a,
                points_b: comparison.sampled_b,
            }),
        }
    }
}

/// Contour-range strategy over reflection edges extracted once per pane
#[derive(Debug, Clone)]
pub struct ContourMatcher {
    pub tolerance: u32,
    edges: Vec<ReflectionEdges>,
}

impl ContourMatcher {
    /// Extract reflection edges for every pane (indexed by pane index)
    pub fn new<E: EdgeExtractor>(
        panes: &[StrippedPane],
        extractor: &E,
        config: &ContourConfig,
    ) -> Self {
        let edges = panes
            .par_iter()
            .map(|pane| extractor.extract(&pane.image))
            .collect();
        Self {
            tolerance: config.tolerance,
            edges,
        }
    }

    /// Use already-computed reflection edges, indexed by pane index
    pub fn from_edges(edges: Vec<ReflectionEdges>, tolerance: u32) -> Self {
        Self { tolerance, edges }
    }

    pub fn edges(&self, index: usize) -> Option<&ReflectionEdges> {
        self.edges.get(index)
    }
}

impl EdgeMatcher for ContourMatcher {
    fn compare(&self, a: &StrippedPane, b: &StrippedPane, direction: Direction) -> PairOutcome {
        let empty = ReflectionEdges::default();
        let edges_a = self.edges(a.index).unwrap_or(&empty);
        let edges_b = self.edges(b.index).unwrap_or(&empty);
        PairOutcome {
            is_match: match_by_contours(
                edges_a,
                edges_b,
                direction,
                &a.rect,
                &b.rect,
                self.tolerance,
            ),
            samples: None,
        }
    }
}
