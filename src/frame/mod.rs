//! Pane frame removal
//!
//! The frame around each pane is removed with fixed margins proportional to
//! the pane's own size. Margins come from configuration; nothing is detected
//! per image.

use crate::types::{FrameConfig, PaneRect};
use image::{imageops, RgbImage};

/// Crop the frame margins off a pane sub-image.
///
/// Returns the cropped image and its box relative to the unstripped pane
/// origin. Combine with the pane origin via [`PaneRect::offset_by`] to get the
/// absolute box.
pub fn strip_frame(pane: &RgbImage, config: &FrameConfig) -> (RgbImage, PaneRect) {
    let relative = frame_interior(pane.width(), pane.height(), config);
    let cropped = imageops::crop_imm(
        pane,
        relative.x,
        relative.y,
        relative.width,
        relative.height,
    )
    .to_image();
    (cropped, relative)
}

/// Interior box of a `width` x `height` pane once margins are removed
pub fn frame_interior(width: u32, height: u32, config: &FrameConfig) -> PaneRect {
    // Truncation matches integer pixel margins
    let vertical = (height as f64 * config.vertical_margin) as u32;
    let horizontal = (width as f64 * config.horizontal_margin) as u32;

    PaneRect {
        x: horizontal,
        y: vertical,
        width: width.saturating_sub(2 * horizontal),
        height: height.saturating_sub(2 * vertical),
    }
}
