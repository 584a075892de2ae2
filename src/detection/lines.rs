//! Axis-constrained grid line detection
//!
//! A Canny edge map is traced along one axis at a time. Traces bridge short
//! gaps and may step one pixel sideways per step; traces that are long enough
//! and stay close to their starting coordinate become segments. The segment
//! midpoints across the line direction are the candidate lines.

use crate::types::{Axis, Error, LineConfig, Result};
use image::{imageops, RgbImage};
use imageproc::edges::canny;
use log::debug;
use ndarray::{Array2, ArrayView2};

/// One accepted edge trace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSegment {
    pub axis: Axis,
    /// Coordinate across the line direction where the trace started
    pub across_start: usize,
    /// Coordinate across the line direction where the trace ended
    pub across_end: usize,
    /// First coordinate along the line direction
    pub along_start: usize,
    /// Last coordinate along the line direction
    pub along_end: usize,
}

impl LineSegment {
    /// Midpoint coordinate across the line direction (x for vertical lines)
    pub fn position(&self) -> u32 {
        ((self.across_start + self.across_end) / 2) as u32
    }

    pub fn length(&self) -> usize {
        self.along_end - self.along_start + 1
    }
}

/// Compute a binary edge map indexed `(y, x)`
pub fn edge_map(image: &RgbImage, low: f32, high: f32) -> Result<Array2<bool>> {
    let gray = imageops::grayscale(image);
    let edges = canny(&gray, low, high);
    let (width, height) = edges.dimensions();
    let raw: Vec<bool> = edges.into_raw().into_iter().map(|v| v > 0).collect();
    Array2::from_shape_vec((height as usize, width as usize), raw)
        .map_err(|e| Error::Processing(format!("Edge map shape error: {}", e)))
}

/// Follow edge pixels from `start` along the line direction.
///
/// With `lateral` the trace may step one pixel sideways, but never to a
/// coordinate `max_deviation` or more away from where it started.
fn trace(
    view: &ArrayView2<bool>,
    visited: &Array2<bool>,
    start: (usize, usize),
    lateral: bool,
    config: &LineConfig,
) -> Vec<(usize, usize)> {
    let (n_across, n_along) = view.dim();
    let max_step = config.max_gap as usize + 1;
    let max_deviation = config.max_deviation as usize;
    let free = |c: usize, s: usize| view[(c, s)] && !visited[(c, s)];

    let mut path = vec![start];
    let (mut cur, mut last) = start;
    let mut next = last + 1;
    while next < n_along && next - last <= max_step {
        let found = if lateral {
            let lo = cur.saturating_sub(1);
            let hi = (cur + 1).min(n_across - 1);
            std::iter::once(cur)
                .chain(lo..=hi)
                .find(|&c| start.0.abs_diff(c) < max_deviation && free(c, next))
        } else {
            Some(cur).filter(|&c| free(c, next))
        };
        if let Some(c) = found {
            path.push((c, next));
            cur = c;
            last = next;
        }
        next += 1;
    }
    path
}

/// Trace near-axis-aligned segments in an edge map.
///
/// Straight runs are claimed first so a crossing or touching edge cannot
/// divert a trace off a grid line. A second pass lets the remaining pixels
/// drift sideways to pick up slightly tilted lines. Only accepted traces
/// claim their pixels.
pub fn detect_segments(edges: &Array2<bool>, axis: Axis, config: &LineConfig) -> Vec<LineSegment> {
    // Index as (across, along): vertical lines run along y, so transpose
    let view: ArrayView2<bool> = match axis {
        Axis::Vertical => edges.t(),
        Axis::Horizontal => edges.view(),
    };
    let (n_across, n_along) = view.dim();
    if n_across == 0 || n_along == 0 {
        return Vec::new();
    }

    let mut visited = Array2::from_elem((n_across, n_along), false);
    let mut segments = Vec::new();

    for lateral in [false, true] {
        for a in 0..n_across {
            for s in 0..n_along {
                if !view[(a, s)] || visited[(a, s)] {
                    continue;
                }

                let path = trace(&view, &visited, (a, s), lateral, config);
                let Some(&(end_across, end_along)) = path.last() else {
                    continue;
                };
                let segment = LineSegment {
                    axis,
                    across_start: a,
                    across_end: end_across,
                    along_start: s,
                    along_end: end_along,
                };
                if segment.length() >= config.min_length as usize
                    && a.abs_diff(end_across) < config.max_deviation as usize
                {
                    for &pixel in &path {
                        visited[pixel] = true;
                    }
                    segments.push(segment);
                }
            }
        }
    }

    segments
}

/// Sort line coordinates and drop any closer than `min_distance` to the last kept one.
///
/// The smallest coordinate is always kept.
pub fn filter_close_lines(lines: &[u32], min_distance: u32) -> Vec<u32> {
    let mut sorted = lines.to_vec();
    sorted.sort_unstable();

    let mut filtered: Vec<u32> = Vec::with_capacity(sorted.len());
    for line in sorted {
        match filtered.last() {
            Some(&kept) if line - kept < min_distance => {}
            _ => filtered.push(line),
        }
    }
    filtered
}

/// Find sorted, deduplicated grid line coordinates along `axis` in an edge map
pub fn find_lines_in_edges(edges: &Array2<bool>, axis: Axis, config: &LineConfig) -> Vec<u32> {
    let candidates: Vec<u32> = detect_segments(edges, axis, config)
        .iter()
        .map(LineSegment::position)
        .collect();
    let lines = filter_close_lines(&candidates, config.min_separation(axis));
    debug!(
        "{:?} lines: {} candidates -> {:?}",
        axis,
        candidates.len(),
        lines
    );
    lines
}

/// Find sorted, deduplicated grid line coordinates along `axis`.
///
/// Returns an empty vector when nothing qualifies; callers treat that as one
/// undivided strip.
pub fn find_lines(image: &RgbImage, axis: Axis, config: &LineConfig) -> Result<Vec<u32>> {
    let edges = edge_map(image, config.canny_low, config.canny_high)?;
    Ok(find_lines_in_edges(&edges, axis, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use proptest::prelude::*;

    fn config(min_length: u32, separation: u32) -> LineConfig {
        LineConfig {
            min_length,
            vertical_min_separation: separation,
            horizontal_min_separation: separation,
            ..LineConfig::default()
        }
    }

    #[test]
    fn test_filter_close_lines() {
        let lines = vec![310, 12, 15, 200, 205, 90];
        assert_eq!(filter_close_lines(&lines, 50), vec![12, 90, 200, 310]);
        assert!(filter_close_lines(&[], 50).is_empty());
    }

    #[test]
    fn test_vertical_segment_position() {
        let mut edges = Array2::from_elem((100, 60), false);
        for y in 10..90 {
            edges[(y, 20)] = true;
        }
        let segments = detect_segments(&edges, Axis::Vertical, &config(50, 10));
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].position(), 20);
        assert_eq!(segments[0].length(), 80);

        assert!(detect_segments(&edges, Axis::Horizontal, &config(50, 10)).is_empty());
    }

    #[test]
    fn test_small_gaps_are_bridged() {
        let mut edges = Array2::from_elem((40, 120), false);
        for x in (5..110).filter(|x| x % 20 != 0) {
            edges[(17, x)] = true;
        }
        let segments = detect_segments(&edges, Axis::Horizontal, &config(90, 10));
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].position(), 17);
    }

    #[test]
    fn test_diagonal_edges_rejected() {
        let mut edges = Array2::from_elem((80, 80), false);
        for i in 0..80 {
            edges[(i, i)] = true;
        }
        assert!(detect_segments(&edges, Axis::Vertical, &config(30, 10)).is_empty());
        assert!(detect_segments(&edges, Axis::Horizontal, &config(30, 10)).is_empty());
    }

    #[test]
    fn test_diagonal_touching_line_keeps_line() {
        let mut edges = Array2::from_elem((200, 80), false);
        for y in 0..200 {
            edges[(y, 50)] = true;
        }
        // 45 degree edge from (30, 0) meeting the line at y = 20
        for i in 0..20 {
            edges[(i, 30 + i)] = true;
        }

        let lines = find_lines_in_edges(&edges, Axis::Vertical, &config(100, 10));
        assert_eq!(lines, vec![50]);
    }

    #[test]
    fn test_crossing_lines_both_found() {
        // X junction: full-height vertical and full-width horizontal edges
        let mut edges = Array2::from_elem((150, 150), false);
        for i in 0..150 {
            edges[(i, 70)] = true;
            edges[(40, i)] = true;
        }
        // T junction: a vertical edge ending on the horizontal one
        for y in 40..150 {
            edges[(y, 120)] = true;
        }

        let vertical = find_lines_in_edges(&edges, Axis::Vertical, &config(100, 10));
        assert_eq!(vertical, vec![70, 120]);
        let horizontal = find_lines_in_edges(&edges, Axis::Horizontal, &config(100, 10));
        assert_eq!(horizontal, vec![40]);
    }

    #[test]
    fn test_slight_tilt_accepted() {
        let mut edges = Array2::from_elem((120, 60), false);
        for y in 0..120 {
            edges[(y, 30 + y / 40)] = true;
        }
        let segments = detect_segments(&edges, Axis::Vertical, &config(100, 10));
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].position(), 31);
    }

    #[test]
    fn test_find_lines_on_bars() {
        let mut image = RgbImage::from_pixel(300, 200, Rgb([210, 210, 210]));
        for y in 0..200 {
            for x in (100..106).chain(220..226) {
                image.put_pixel(x, y, Rgb([30, 30, 30]));
            }
        }
        let lines = find_lines(&image, Axis::Vertical, &config(100, 50)).unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].abs_diff(100) <= 2, "got {:?}", lines);
        assert!(lines[1].abs_diff(220) <= 2, "got {:?}", lines);

        assert!(find_lines(&image, Axis::Horizontal, &config(100, 50))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_blank_image_has_no_lines() {
        let image = RgbImage::from_pixel(64, 64, Rgb([128, 128, 128]));
        assert!(find_lines(&image, Axis::Vertical, &config(10, 10))
            .unwrap()
            .is_empty());
    }

    proptest! {
        #[test]
        fn prop_filter_close_lines(
            lines in prop::collection::vec(0..5000u32, 0..64),
            min_distance in 0..600u32,
        ) {
            let filtered = filter_close_lines(&lines, min_distance);

            for pair in filtered.windows(2) {
                prop_assert!(pair[0] <= pair[1]);
                prop_assert!(pair[1] - pair[0] >= min_distance);
            }
            if let Some(&min) = lines.iter().min() {
                prop_assert_eq!(filtered.first().copied(), Some(min));
            } else {
                prop_assert!(filtered.is_empty());
            }
        }
    }
}
