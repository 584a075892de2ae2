//! Structured inspection report and JSON output

use crate::types::{Adjacency, MatchMethod, MatchResult, PaneRect, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// One decomposed pane as reported
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaneSummary {
    pub index: usize,
    pub column: usize,
    pub row: usize,
    /// Absolute frame-stripped box
    pub rect: PaneRect,
    pub adjacency: Adjacency,
}

/// Everything one inspection produced besides the annotated image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionReport {
    pub method: MatchMethod,
    pub width: u32,
    pub height: u32,
    pub columns: usize,
    pub panes: Vec<PaneSummary>,
    /// One entry per evaluated adjacent pair, in traversal order
    pub results: Vec<MatchResult>,
}

impl InspectionReport {
    pub fn matched(&self) -> usize {
        self.results.iter().filter(|r| r.is_match).count()
    }

    pub fn mismatched(&self) -> usize {
        self.results.len() - self.matched()
    }

    /// Results involving `pane`
    pub fn results_for(&self, pane: usize) -> impl Iterator<Item = &MatchResult> + '_ {
        self.results
            .iter()
            .filter(move |r| r.pane_a == pane || r.pane_b == pane)
    }

    /// Panes whose every evaluated seam mismatches, the signature of a
    /// tilted or bowed pane rather than a one-off disagreement
    pub fn suspect_panes(&self) -> Vec<usize> {
        self.panes
            .iter()
            .map(|p| p.index)
            .filter(|&idx| {
                let mut results = self.results_for(idx).peekable();
                results.peek().is_some() && results.all(|r| !r.is_match)
            })
            .collect()
    }
}

/// Consumer-facing result record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgePairResult {
    #[serde(rename = "edgePair")]
    pub edge_pair: [usize; 2],
    #[serde(rename = "isMatch")]
    pub is_match: bool,
}

pub fn consumer_entries(report: &InspectionReport) -> Vec<EdgePairResult> {
    report
        .results
        .iter()
        .map(|r| EdgePairResult {
            edge_pair: [r.pane_a, r.pane_b],
            is_match: r.is_match,
        })
        .collect()
}

/// Write the full report as pretty-printed JSON
pub fn write_json(path: &Path, report: &InspectionReport) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Direction;

    fn sample_report() -> InspectionReport {
        InspectionReport {
            method: MatchMethod::Contours,
            width: 800,
            height: 600,
            columns: 2,
            panes: Vec::new(),
            results: vec![
                MatchResult {
                    pane_a: 0,
                    pane_b: 1,
                    direction: Direction::Down,
                    is_match: true,
                },
                MatchResult {
                    pane_a: 0,
                    pane_b: 2,
                    direction: Direction::Right,
                    is_match: false,
                },
            ],
        }
    }

    #[test]
    fn test_counts() {
        let report = sample_report();
        assert_eq!(report.matched(), 1);
        assert_eq!(report.mismatched(), 1);
        assert_eq!(report.results_for(2).count(), 1);
    }

    #[test]
    fn test_suspect_panes() {
        let mut report = sample_report();
        report.panes = (0..3)
            .map(|index| PaneSummary {
                index,
                column: index,
                row: 0,
                rect: PaneRect::new(0, 0, 10, 10),
                adjacency: Adjacency::default(),
            })
            .collect();
        // Pane 2 only borders the mismatched seam; pane 0 has one good seam
        assert_eq!(report.suspect_panes(), vec![2]);

        report.results.clear();
        assert!(report.suspect_panes().is_empty());
    }

    #[test]
    fn test_consumer_json_shape() {
        let entries = consumer_entries(&sample_report());
        let json = serde_json::to_value(&entries).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"edgePair": [0, 1], "isMatch": true},
                {"edgePair": [0, 2], "isMatch": false}
            ])
        );
    }

    #[test]
    fn test_write_json_round_trip() {
        let path = std::env::temp_dir().join("facade_flatness_report_test.json");
        let report = sample_report();
        write_json(&path, &report).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let parsed: InspectionReport = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, report);
        assert!(text.contains("\"method\": \"contours\""));

        std::fs::remove_file(path).ok();
    }
}
