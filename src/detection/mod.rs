//! Grid line detection

pub mod lines;

pub use lines::{edge_map, filter_close_lines, find_lines, find_lines_in_edges, LineSegment};
