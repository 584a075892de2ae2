//! Chroma-sampling edge comparison
//!
//! Flat, aligned panes reflect continuous scenery across the seam, so the
//! glass/reflection pattern along the two facing lines lines up point for
//! point. Warped panes break that correspondence.

use super::{chroma, facing_line};
use crate::types::{ChromaConfig, Direction};
use image::RgbImage;

/// Outcome of a chroma comparison, with the sampled pane-local points
#[derive(Debug, Clone, PartialEq)]
pub struct ChromaComparison {
    pub is_match: bool,
    /// Agreeing sample pairs divided by the configured sample count
    pub agreement: f64,
    pub sampled_a: Vec<(u32, u32)>,
    pub sampled_b: Vec<(u32, u32)>,
}

/// Uniformly subsample a line down to at most `sample_points` points
pub fn sample_line(line: &[(u32, u32)], sample_points: usize) -> Vec<(u32, u32)> {
    let stride = (line.len() / sample_points.max(1)).max(1);
    line.iter()
        .step_by(stride)
        .take(sample_points)
        .copied()
        .collect()
}

/// Compare the facing edges of two panes by glass/reflection classification.
///
/// `direction` is the side of `image_a` facing `image_b`: for `Up`, A's line
/// `offset` pixels below its top is compared with B's line `offset` pixels
/// above its bottom. The agreement ratio is taken over the configured sample
/// count, so lines shorter than `sample_points` pixels cannot reach full
/// agreement. A match requires the ratio to strictly exceed
/// `agreement_ratio`.
pub fn match_by_chroma(
    image_a: &RgbImage,
    image_b: &RgbImage,
    direction: Direction,
    config: &ChromaConfig,
) -> ChromaComparison {
    let line_a = facing_line(image_a.width(), image_a.height(), direction, config.offset);
    let line_b = facing_line(
        image_b.width(),
        image_b.height(),
        direction.opposite(),
        config.offset,
    );

    let sampled_a = sample_line(&line_a, config.sample_points);
    let sampled_b = sample_line(&line_b, config.sample_points);

    let is_glass = |image: &RgbImage, &(x, y): &(u32, u32)| {
        chroma(image.get_pixel(x, y)) < config.chroma_threshold
    };

    let agreeing = sampled_a
        .iter()
        .zip(&sampled_b)
        .filter(|&(pa, pb)| is_glass(image_a, pa) == is_glass(image_b, pb))
        .count();

    let agreement = agreeing as f64 / config.sample_points.max(1) as f64;

    ChromaComparison {
        is_match: agreement > config.agreement_ratio,
        agreement,
        sampled_a,
        sampled_b,
    }
}
