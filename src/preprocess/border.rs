//! External structural-border segmentation process

use crate::types::BorderSegmentationConfig;
use image::RgbImage;
use log::{info, warn};
use std::path::Path;
use std::process::Command;

/// Run the segmentation process once and load the mask it writes to
/// `<save_dir>/<image stem>.png`.
///
/// Best effort: a spawn failure, non-zero exit or missing/unreadable mask is
/// logged and yields `None`, and the caller continues without a mask.
pub fn run_border_segmentation(
    config: &BorderSegmentationConfig,
    image_path: &Path,
) -> Option<RgbImage> {
    let Some(stem) = image_path.file_stem().and_then(|s| s.to_str()) else {
        warn!(
            "Cannot derive border mask name from {}; skipping border segmentation",
            image_path.display()
        );
        return None;
    };
    let mask_path = config.save_dir.join(format!("{}.png", stem));

    let status = Command::new(&config.program)
        .args(&config.args)
        .arg("--config")
        .arg(&config.config_file)
        .arg("--image_path")
        .arg(image_path)
        .arg("--save_dir")
        .arg(&config.save_dir)
        .status();

    match status {
        Ok(status) if status.success() => {
            info!("Border segmentation completed: {}", mask_path.display());
        }
        Ok(status) => {
            warn!("Border segmentation failed ({}); continuing without mask", status);
            return None;
        }
        Err(e) => {
            warn!(
                "Could not run border segmentation {}: {}; continuing without mask",
                config.program.display(),
                e
            );
            return None;
        }
    }

    match image::open(&mask_path) {
        Ok(mask) => Some(mask.to_rgb8()),
        Err(e) => {
            warn!(
                "Border mask {} unreadable: {}; continuing without mask",
                mask_path.display(),
                e
            );
            None
        }
    }
}
