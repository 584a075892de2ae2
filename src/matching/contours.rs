//! Contour-range edge comparison

use crate::types::{Direction, PaneRect};
use log::debug;

/// Pane-local `(start, end)` coordinates along an edge where reflected
/// scenery touches it
pub type Span = (u32, u32);

/// Reflection spans on each side of one pane
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReflectionEdges {
    pub up: Vec<Span>,
    pub down: Vec<Span>,
    pub left: Vec<Span>,
    pub right: Vec<Span>,
}

impl ReflectionEdges {
    pub fn get(&self, direction: Direction) -> &[Span] {
        match direction {
            Direction::Up => &self.up,
            Direction::Down => &self.down,
            Direction::Left => &self.left,
            Direction::Right => &self.right,
        }
    }

    pub fn set(&mut self, direction: Direction, spans: Vec<Span>) {
        match direction {
            Direction::Up => self.up = spans,
            Direction::Down => self.down = spans,
            Direction::Left => self.left = spans,
            Direction::Right => self.right = spans,
        }
    }
}

/// First span on an edge; extra spans are ignored
fn leading_span(edges: &ReflectionEdges, side: Direction) -> Option<Span> {
    let spans = edges.get(side);
    if spans.len() > 1 {
        debug!(
            "{} edge has {} reflection ranges, comparing only the first",
            side,
            spans.len()
        );
    }
    spans.first().copied()
}

fn span_extent((start, end): Span) -> u32 {
    start.abs_diff(end)
}

/// Compare the reflection ranges on the facing edges of two panes.
///
/// `direction` is the side of pane A facing pane B. Decision, first rule wins:
/// 1. both facing edges have a range: convert the first of each to absolute
///    coordinates and match iff both starts and both ends differ by less than
///    `tolerance`;
/// 2. only one side has a range: match iff that range spans less than
///    `tolerance`;
/// 3. neither has a range: match.
pub fn match_by_contours(
    edges_a: &ReflectionEdges,
    edges_b: &ReflectionEdges,
    direction: Direction,
    rect_a: &PaneRect,
    rect_b: &PaneRect,
    tolerance: u32,
) -> bool {
    let facing_a = leading_span(edges_a, direction);
    let facing_b = leading_span(edges_b, direction.opposite());

    match (facing_a, facing_b) {
        (Some((start_a, end_a)), Some((start_b, end_b))) => {
            let axis = direction.span_axis();
            let origin_a = rect_a.origin_along(axis);
            let origin_b = rect_b.origin_along(axis);
            let (abs_start_a, abs_end_a) = (start_a as i64 + origin_a, end_a as i64 + origin_a);
            let (abs_start_b, abs_end_b) = (start_b as i64 + origin_b, end_b as i64 + origin_b);
            debug!(
                "{} edge ({}, {}) vs {} edge ({}, {})",
                direction,
                abs_start_a,
                abs_end_a,
                direction.opposite(),
                abs_start_b,
                abs_end_b
            );
            let tolerance = tolerance as i64;
            (abs_start_a - abs_start_b).abs() < tolerance
                && (abs_end_a - abs_end_b).abs() < tolerance
        }
        (Some(span), None) | (None, Some(span)) => span_extent(span) < tolerance,
        (None, None) => true,
    }
}
