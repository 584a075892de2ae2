//! Reflection edge extraction for the contour strategy

use super::contours::{ReflectionEdges, Span};
use super::{facing_line, is_reflection};
use crate::types::{ContourConfig, Direction};
use image::RgbImage;

/// Produces, for each side of a stripped pane, the ranges where reflected
/// scenery touches that side
pub trait EdgeExtractor: Sync {
    fn extract(&self, pane: &RgbImage) -> ReflectionEdges;
}

/// Scans the pixel line just inside each side and reports contiguous runs of
/// reflection pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryRunExtractor {
    /// Distance of the scanned line from the pane side
    pub inset: u32,
    /// Runs shorter than this are dropped
    pub min_run: u32,
    pub chroma_threshold: f64,
}

impl From<&ContourConfig> for BoundaryRunExtractor {
    fn from(config: &ContourConfig) -> Self {
        Self {
            inset: config.edge_inset,
            min_run: config.min_run,
            chroma_threshold: config.chroma_threshold,
        }
    }
}

impl Default for BoundaryRunExtractor {
    fn default() -> Self {
        Self::from(&ContourConfig::default())
    }
}

impl BoundaryRunExtractor {
    /// Inclusive runs of reflection pixels along one side, in pane-local
    /// coordinates along that side
    pub fn side_runs(&self, pane: &RgbImage, side: Direction) -> Vec<Span> {
        let line = facing_line(pane.width(), pane.height(), side, self.inset);
        let mut runs = Vec::new();
        let mut start: Option<u32> = None;

        for (i, &(x, y)) in line.iter().enumerate() {
            let i = i as u32;
            match (is_reflection(pane.get_pixel(x, y), self.chroma_threshold), start) {
                (true, None) => start = Some(i),
                (false, Some(s)) => {
                    runs.push((s, i - 1));
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(s) = start {
            runs.push((s, line.len() as u32 - 1));
        }

        runs.retain(|&(s, e)| e - s + 1 >= self.min_run);
        runs
    }
}

impl EdgeExtractor for BoundaryRunExtractor {
    fn extract(&self, pane: &RgbImage) -> ReflectionEdges {
        let mut edges = ReflectionEdges::default();
        for side in Direction::ALL {
            edges.set(side, self.side_runs(pane, side));
        }
        edges
    }
}
