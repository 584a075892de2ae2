//! Facade flatness: glass curtain-wall pane alignment inspection
//!
//! A facade photograph is split into panes along its mullion lines, each pane
//! is stripped of its own frame, and every pair of adjacent panes is checked
//! for continuity of the scenery reflected across their shared boundary. A
//! tilted or bowed pane breaks that continuity.

pub mod annotate;
pub mod detection;
pub mod frame;
pub mod grid;
pub mod image_io;
pub mod matching;
pub mod pipeline;
pub mod preprocess;
pub mod report;
pub mod types;

pub use pipeline::{inspect, inspect_prepared, Inspection};
pub use report::InspectionReport;

use log::info;
use std::path::Path;
use std::time::Instant;
use types::{InspectionConfig, Result};

/// Main entry point: inspect a facade photograph on disk
///
/// # Arguments
/// * `input_path` - Path to the facade image
/// * `output_path` - Path for the annotated image
/// * `config` - Inspection configuration
///
/// # Returns
/// The structured report of every evaluated pane pair
pub fn inspect_image(
    input_path: &Path,
    output_path: &Path,
    config: &InspectionConfig,
) -> Result<InspectionReport> {
    config.validate()?;
    let start_time = Instant::now();

    info!("Loading image {}", input_path.display());
    let image = image_io::load_image(input_path)?;
    if config.benchmark {
        info!("  Load time: {:.2}s", start_time.elapsed().as_secs_f32());
    }

    let prepare_start = Instant::now();
    let prepared = preprocess::prepare(&image, input_path, config);
    if config.benchmark {
        info!("  Preprocess time: {:.2}s", prepare_start.elapsed().as_secs_f32());
    }

    let Inspection { annotated, report } = inspect_prepared(&image, &prepared, config)?;

    let save_start = Instant::now();
    image_io::save_image(output_path, &annotated)?;
    if config.benchmark {
        info!("  Save time: {:.2}s", save_start.elapsed().as_secs_f32());
    }

    info!(
        "Completed in {:.2}s: {}/{} pairs match",
        start_time.elapsed().as_secs_f32(),
        report.matched(),
        report.results.len()
    );

    Ok(report)
}
