//! Facade grid decomposition
//!
//! Vertical lines split the facade into column strips, then horizontal lines
//! split every strip into rows. The outermost strip and row on each side
//! belong to the facade frame and are dropped. Surviving cells get
//! sequential indices in column-major order, and neighbours are resolved
//! through a `(column, row)` lookup table so columns with differing row
//! counts still get consistent, symmetric adjacency.

use crate::detection::find_lines;
use crate::types::{Adjacency, Axis, Direction, LineConfig, Result};
use image::{imageops, RgbImage};
use log::{debug, warn};
use rayon::prelude::*;
use std::collections::HashMap;
use std::ops::Range;

/// One window pane cut out of the facade image
#[derive(Debug, Clone)]
pub struct Pane {
    /// Global index, column-major
    pub index: usize,
    pub column: usize,
    pub row: usize,
    /// Unstripped pane sub-image
    pub image: RgbImage,
    /// Absolute top-left of `image` within the facade
    pub origin: (u32, u32),
    pub adjacency: Adjacency,
}

/// Maps grid cells to pane indices and back
#[derive(Debug, Clone, Default)]
pub struct GridIndex {
    cells: Vec<(usize, usize)>,
    lookup: HashMap<(usize, usize), usize>,
}

impl GridIndex {
    /// Index cells column by column, top to bottom
    pub fn from_row_counts(row_counts: &[usize]) -> Self {
        let mut index = Self::default();
        for (column, &rows) in row_counts.iter().enumerate() {
            for row in 0..rows {
                index.push(column, row);
            }
        }
        index
    }

    fn push(&mut self, column: usize, row: usize) -> usize {
        let idx = self.cells.len();
        self.cells.push((column, row));
        self.lookup.insert((column, row), idx);
        idx
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn pane_at(&self, column: usize, row: usize) -> Option<usize> {
        self.lookup.get(&(column, row)).copied()
    }

    pub fn cell_of(&self, index: usize) -> Option<(usize, usize)> {
        self.cells.get(index).copied()
    }

    /// Neighbour slots of the pane at `index`
    pub fn adjacency(&self, index: usize) -> Adjacency {
        let mut adjacency = Adjacency::default();
        let Some((column, row)) = self.cell_of(index) else {
            return adjacency;
        };
        for direction in Direction::ALL {
            let neighbor = match direction {
                Direction::Up => row.checked_sub(1).and_then(|r| self.pane_at(column, r)),
                Direction::Down => self.pane_at(column, row + 1),
                Direction::Left => column.checked_sub(1).and_then(|c| self.pane_at(c, row)),
                Direction::Right => self.pane_at(column + 1, row),
            };
            adjacency.set(direction, neighbor);
        }
        adjacency
    }
}

/// Result of decomposing a facade image
#[derive(Debug, Clone, Default)]
pub struct GridLayout {
    pub panes: Vec<Pane>,
    /// Number of surviving pane columns
    pub columns: usize,
    pub index: GridIndex,
}

impl GridLayout {
    pub fn len(&self) -> usize {
        self.panes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panes.is_empty()
    }
}

/// Cut `0..extent` at every line, keeping the leading and trailing remainder
pub fn split_ranges(lines: &[u32], extent: u32) -> Vec<Range<u32>> {
    let mut ranges = Vec::with_capacity(lines.len() + 1);
    let mut start = 0;
    for &pos in lines {
        let end = pos.clamp(start, extent);
        ranges.push(start..end);
        start = end;
    }
    ranges.push(start..extent);
    ranges
}

/// Drop the first and last range (outer facade frame) when at least two exist
pub fn trim_outer(mut ranges: Vec<Range<u32>>) -> Vec<Range<u32>> {
    if ranges.len() >= 2 {
        ranges.pop();
        ranges.remove(0);
    }
    ranges
}

fn usable(ranges: Vec<Range<u32>>, axis: Axis) -> Vec<Range<u32>> {
    ranges
        .into_iter()
        .filter(|r| {
            let keep = !r.is_empty();
            if !keep {
                debug!("Skipping empty {:?} strip at {}", axis, r.start);
            }
            keep
        })
        .collect()
}

fn crop(image: &RgbImage, xs: &Range<u32>, ys: &Range<u32>) -> RgbImage {
    imageops::crop_imm(image, xs.start, ys.start, xs.len() as u32, ys.len() as u32).to_image()
}

/// Decompose a facade image into panes with absolute origins and adjacency
pub fn decompose(image: &RgbImage, config: &LineConfig) -> Result<GridLayout> {
    let (width, height) = image.dimensions();

    let vlines = find_lines(image, Axis::Vertical, config)?;
    if vlines.is_empty() {
        warn!("No vertical grid lines found; treating the facade as one column");
    }
    let columns = usable(trim_outer(split_ranges(&vlines, width)), Axis::Vertical);
    debug!("Vertical lines {:?} -> {} pane columns", vlines, columns.len());

    // Horizontal passes are independent per strip
    let rows_per_column: Vec<Vec<Range<u32>>> = columns
        .par_iter()
        .enumerate()
        .map(|(c, xs)| -> Result<Vec<Range<u32>>> {
            let strip = crop(image, xs, &(0..height));
            let hlines = find_lines(&strip, Axis::Horizontal, config)?;
            if hlines.is_empty() {
                warn!("No horizontal grid lines in column {}; treating it as one row", c);
            }
            let rows = usable(trim_outer(split_ranges(&hlines, height)), Axis::Horizontal);
            debug!("Column {}: horizontal lines {:?} -> {} rows", c, hlines, rows.len());
            Ok(rows)
        })
        .collect::<Result<_>>()?;

    let row_counts: Vec<usize> = rows_per_column.iter().map(Vec::len).collect();
    let index = GridIndex::from_row_counts(&row_counts);

    let mut panes = Vec::with_capacity(index.len());
    for (column, (xs, rows)) in columns.iter().zip(&rows_per_column).enumerate() {
        for (row, ys) in rows.iter().enumerate() {
            let idx = panes.len();
            panes.push(Pane {
                index: idx,
                column,
                row,
                image: crop(image, xs, ys),
                origin: (xs.start, ys.start),
                adjacency: index.adjacency(idx),
            });
        }
    }

    if panes.is_empty() {
        warn!("Grid decomposition produced no panes");
    }

    Ok(GridLayout {
        panes,
        columns: columns.len(),
        index,
    })
}
