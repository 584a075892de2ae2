//! Preparation of the image the grid decomposer consumes
//!
//! A global Otsu threshold separates bright bare glass from the darker
//! reflected scenery, and an optional structural-border mask from an external
//! segmentation process is painted over the result.

pub mod border;

pub use border::run_border_segmentation;

use crate::types::InspectionConfig;
use image::{imageops, Rgb, RgbImage};
use imageproc::contrast::otsu_level;
use log::{debug, warn};
use std::path::Path;

/// Keep reflected-scene pixels, blank out bare glass.
///
/// Pixels whose luma is above the Otsu level are treated as glass background
/// and set to black.
pub fn extract_reflection(image: &RgbImage) -> RgbImage {
    let gray = imageops::grayscale(image);
    let level = otsu_level(&gray);
    debug!("Reflection extraction Otsu level: {}", level);

    let mut reflection = image.clone();
    for (pixel, luma) in reflection.pixels_mut().zip(gray.pixels()) {
        if luma[0] > level {
            *pixel = Rgb([0, 0, 0]);
        }
    }
    reflection
}

/// Paint border mask pixels (non-zero green channel) over `base`.
///
/// A mask of a different size is ignored with a warning.
pub fn composite_border(base: &RgbImage, mask: &RgbImage) -> RgbImage {
    if base.dimensions() != mask.dimensions() {
        warn!(
            "Border mask is {}x{} but image is {}x{}; ignoring mask",
            mask.width(),
            mask.height(),
            base.width(),
            base.height()
        );
        return base.clone();
    }

    let mut composite = base.clone();
    for (pixel, mask_pixel) in composite.pixels_mut().zip(mask.pixels()) {
        if mask_pixel[1] > 0 {
            *pixel = *mask_pixel;
        }
    }
    composite
}

/// Build the image to decompose: reflection extraction plus the border mask
/// when the segmentation collaborator is configured and succeeds.
///
/// `image_path` is handed to the collaborator, which reads the file itself.
pub fn prepare(image: &RgbImage, image_path: &Path, config: &InspectionConfig) -> RgbImage {
    if config.skip_preprocess {
        return image.clone();
    }

    let reflection = extract_reflection(image);
    match config
        .border
        .as_ref()
        .and_then(|border| run_border_segmentation(border, image_path))
    {
        Some(mask) => composite_border(&reflection, &mask),
        None => reflection,
    }
}
