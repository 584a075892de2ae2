//! Inspection orchestration
//!
//! Decompose the grid, strip pane frames, evaluate every adjacent pair once
//! (pure and in parallel), then draw the audit overlay from the collected
//! evaluations.

use crate::annotate::{draw_pane, draw_samples, SAMPLE_COLOR_A, SAMPLE_COLOR_B};
use crate::frame::strip_frame;
use crate::grid::{decompose, GridLayout};
use crate::matching::{
    BoundaryRunExtractor, ChromaMatcher, ContourMatcher, EdgeMatcher, EdgeSamples, StrippedPane,
};
use crate::report::{InspectionReport, PaneSummary};
use crate::types::{
    AnnotationConfig, Direction, Error, FrameConfig, InspectionConfig, MatchMethod, MatchResult,
    Result,
};
use image::RgbImage;
use log::{debug, info};
use rayon::prelude::*;
use std::time::Instant;

/// An adjacent pair to compare; `pane_a < pane_b`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanePair {
    pub pane_a: usize,
    pub pane_b: usize,
    /// Side of `pane_a` facing `pane_b`
    pub direction: Direction,
}

/// A compared pair with the samples to draw
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairEvaluation {
    pub result: MatchResult,
    pub samples: Option<EdgeSamples>,
}

/// Annotated image plus structured report
#[derive(Debug, Clone)]
pub struct Inspection {
    pub annotated: RgbImage,
    pub report: InspectionReport,
}

/// Frame-strip every pane and place it in absolute coordinates
pub fn strip_panes(layout: &GridLayout, config: &FrameConfig) -> Vec<StrippedPane> {
    layout
        .panes
        .par_iter()
        .map(|pane| {
            let (image, relative) = strip_frame(&pane.image, config);
            StrippedPane {
                index: pane.index,
                rect: relative.offset_by(pane.origin.0, pane.origin.1),
                image,
            }
        })
        .collect()
}

/// Adjacent pairs in traversal order: pane index ascending, then
/// up/down/left/right. Only the smaller index initiates a pair.
pub fn adjacent_pairs(layout: &GridLayout) -> Vec<PanePair> {
    layout
        .panes
        .iter()
        .flat_map(|pane| {
            pane.adjacency
                .neighbors()
                .filter(move |&(_, neighbor)| neighbor > pane.index)
                .map(move |(direction, neighbor)| PanePair {
                    pane_a: pane.index,
                    pane_b: neighbor,
                    direction,
                })
        })
        .collect()
}

/// Evaluate every pair with `matcher`; output order follows `pairs`
pub fn evaluate_pairs<M: EdgeMatcher>(
    panes: &[StrippedPane],
    pairs: &[PanePair],
    matcher: &M,
) -> Vec<PairEvaluation> {
    pairs
        .par_iter()
        .map(|pair| {
            let outcome = matcher.compare(&panes[pair.pane_a], &panes[pair.pane_b], pair.direction);
            debug!(
                "Pane {} {} pane {}: {}",
                pair.pane_a,
                pair.direction,
                pair.pane_b,
                if outcome.is_match { "match" } else { "mismatch" }
            );
            PairEvaluation {
                result: MatchResult {
                    pane_a: pair.pane_a,
                    pane_b: pair.pane_b,
                    direction: pair.direction,
                    is_match: outcome.is_match,
                },
                samples: outcome.samples,
            }
        })
        .collect()
}

/// Draw samples, outlines and labels for every evaluated pair onto a copy of `image`
pub fn annotate(
    image: &RgbImage,
    panes: &[StrippedPane],
    evaluations: &[PairEvaluation],
    config: &AnnotationConfig,
) -> RgbImage {
    let mut canvas = image.clone();

    if config.draw_samples {
        for evaluation in evaluations {
            if let Some(samples) = &evaluation.samples {
                let radius = config.point_radius;
                let rect_a = &panes[evaluation.result.pane_a].rect;
                let rect_b = &panes[evaluation.result.pane_b].rect;
                draw_samples(&mut canvas, rect_a, &samples.points_a, SAMPLE_COLOR_A, radius);
                draw_samples(&mut canvas, rect_b, &samples.points_b, SAMPLE_COLOR_B, radius);
            }
        }
    }

    let mut drawn = vec![false; panes.len()];
    for evaluation in evaluations {
        for idx in [evaluation.result.pane_a, evaluation.result.pane_b] {
            if !drawn[idx] {
                draw_pane(&mut canvas, idx, &panes[idx].rect, config);
                drawn[idx] = true;
            }
        }
    }

    canvas
}

/// Run the full inspection on an image that needs no preparation
pub fn inspect(image: &RgbImage, config: &InspectionConfig) -> Result<Inspection> {
    inspect_prepared(image, image, config)
}

/// Decompose and compare `prepared`, annotate a copy of `original`.
///
/// Both images must share dimensions since pane boxes found in one are drawn
/// on the other.
pub fn inspect_prepared(
    original: &RgbImage,
    prepared: &RgbImage,
    config: &InspectionConfig,
) -> Result<Inspection> {
    config.validate()?;
    if original.dimensions() != prepared.dimensions() {
        return Err(Error::Processing(format!(
            "prepared image is {}x{} but original is {}x{}",
            prepared.width(),
            prepared.height(),
            original.width(),
            original.height()
        )));
    }
    let start = Instant::now();

    let layout = decompose(prepared, &config.lines)?;
    let panes = strip_panes(&layout, &config.frame);
    if config.benchmark {
        info!(
            "  Decomposition: {} panes in {} columns, {:.2}s",
            panes.len(),
            layout.columns,
            start.elapsed().as_secs_f32()
        );
    }

    let pairs = adjacent_pairs(&layout);
    let compare_start = Instant::now();
    let evaluations = match config.method {
        MatchMethod::Chroma => {
            evaluate_pairs(&panes, &pairs, &ChromaMatcher::new(config.chroma.clone()))
        }
        MatchMethod::Contours => {
            let extractor = BoundaryRunExtractor::from(&config.contours);
            let matcher = ContourMatcher::new(&panes, &extractor, &config.contours);
            evaluate_pairs(&panes, &pairs, &matcher)
        }
    };
    if config.benchmark {
        info!(
            "  Comparison ({}): {} pairs in {:.2}s",
            config.method,
            evaluations.len(),
            compare_start.elapsed().as_secs_f32()
        );
    }

    let annotated = annotate(original, &panes, &evaluations, &config.annotation);

    let report = InspectionReport {
        method: config.method,
        width: original.width(),
        height: original.height(),
        columns: layout.columns,
        panes: layout
            .panes
            .iter()
            .zip(&panes)
            .map(|(pane, stripped)| PaneSummary {
                index: pane.index,
                column: pane.column,
                row: pane.row,
                rect: stripped.rect,
                adjacency: pane.adjacency,
            })
            .collect(),
        results: evaluations.into_iter().map(|e| e.result).collect(),
    };

    info!(
        "Inspected {} panes: {} pairs, {} mismatched",
        report.panes.len(),
        report.results.len(),
        report.mismatched()
    );

    Ok(Inspection { annotated, report })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{GridIndex, Pane};
    use image::Rgb;
    use std::collections::HashSet;

    fn layout(row_counts: &[usize]) -> GridLayout {
        let index = GridIndex::from_row_counts(row_counts);
        let panes = (0..index.len())
            .map(|idx| {
                let (column, row) = index.cell_of(idx).unwrap();
                Pane {
                    index: idx,
                    column,
                    row,
                    image: RgbImage::from_pixel(100, 100, Rgb([90, 90, 90])),
                    origin: (column as u32 * 100, row as u32 * 100),
                    adjacency: index.adjacency(idx),
                }
            })
            .collect();
        GridLayout {
            panes,
            columns: row_counts.len(),
            index,
        }
    }

    #[test]
    fn test_pairs_are_emitted_once() {
        let layout = layout(&[2, 2, 2]);
        let pairs = adjacent_pairs(&layout);
        assert_eq!(pairs.len(), 7);

        let mut seen = HashSet::new();
        for pair in &pairs {
            assert!(pair.pane_a < pair.pane_b);
            assert!(seen.insert((pair.pane_a, pair.pane_b)));
            assert!(!seen.contains(&(pair.pane_b, pair.pane_a)));
        }

        assert_eq!(
            pairs[0],
            PanePair {
                pane_a: 0,
                pane_b: 1,
                direction: Direction::Down
            }
        );
        assert_eq!(pairs[1].direction, Direction::Right);
    }

    #[test]
    fn test_single_pane_has_no_pairs() {
        assert!(adjacent_pairs(&layout(&[1])).is_empty());
        assert!(adjacent_pairs(&layout(&[])).is_empty());
    }

    #[test]
    fn test_strip_panes_absolute_boxes() {
        let panes = strip_panes(&layout(&[1, 1]), &FrameConfig::default());
        assert_eq!(panes[1].rect, crate::types::PaneRect::new(106, 11, 88, 78));
        assert_eq!(panes[1].image.dimensions(), (88, 78));
    }

    #[test]
    fn test_uniform_gray_grid_all_match() {
        let layout = layout(&[2, 2]);
        let panes = strip_panes(&layout, &FrameConfig::default());
        let pairs = adjacent_pairs(&layout);
        let matcher = ChromaMatcher::new(crate::types::ChromaConfig {
            sample_points: 50,
            ..Default::default()
        });
        let evaluations = evaluate_pairs(&panes, &pairs, &matcher);
        assert_eq!(evaluations.len(), 4);
        assert!(evaluations.iter().all(|e| e.result.is_match));
    }

    #[test]
    fn test_prepared_size_mismatch_rejected() {
        let original = RgbImage::new(40, 40);
        let prepared = RgbImage::new(40, 20);
        let result = inspect_prepared(&original, &prepared, &InspectionConfig::default());
        assert!(matches!(result, Err(Error::Processing(_))));
    }

    #[test]
    fn test_annotation_marks_evaluated_panes_only() {
        let layout = layout(&[1, 1]);
        let panes = strip_panes(&layout, &FrameConfig::default());
        let image = RgbImage::from_pixel(300, 100, Rgb([0, 0, 0]));
        let evaluations = vec![PairEvaluation {
            result: MatchResult {
                pane_a: 0,
                pane_b: 1,
                direction: Direction::Right,
                is_match: true,
            },
            samples: None,
        }];
        let config = AnnotationConfig {
            thickness: 2,
            label_height: 20,
            ..Default::default()
        };
        let annotated = annotate(&image, &panes, &evaluations, &config);
        let color = Rgb(config.color);
        assert_eq!(annotated.get_pixel(panes[0].rect.x, panes[0].rect.y), &color);
        assert_eq!(annotated.get_pixel(panes[1].rect.x, panes[1].rect.y), &color);
        assert_eq!(annotated.get_pixel(250, 50), &Rgb([0, 0, 0]));
    }
}
