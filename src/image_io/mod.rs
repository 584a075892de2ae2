//! Facade image loading and annotated output saving

use crate::types::{Error, Result};
use image::{DynamicImage, ImageReader, RgbImage};
use std::path::{Path, PathBuf};

/// Load a facade photograph as 8-bit RGB.
///
/// Any failure to open, decode or interpret the pixels is reported as
/// [`Error::UnreadableInput`] so the inspection stops before touching
/// undefined pixel data.
pub fn load_image(path: &Path) -> Result<RgbImage> {
    let mut reader = ImageReader::open(path).map_err(|e| {
        Error::UnreadableInput(format!("cannot open {}: {}", path.display(), e))
    })?;
    reader.no_limits();
    let reader = reader.with_guessed_format().map_err(|e| {
        Error::UnreadableInput(format!("cannot read {}: {}", path.display(), e))
    })?;
    let img = reader.decode().map_err(|e| {
        Error::UnreadableInput(format!("cannot decode {}: {}", path.display(), e))
    })?;

    to_rgb(img).map_err(|e| match e {
        Error::UnreadableInput(msg) => {
            Error::UnreadableInput(format!("{}: {}", path.display(), msg))
        }
        other => other,
    })
}

fn to_rgb(img: DynamicImage) -> Result<RgbImage> {
    if img.width() == 0 || img.height() == 0 {
        return Err(Error::UnreadableInput(format!(
            "image has no pixels ({}x{})",
            img.width(),
            img.height()
        )));
    }

    match img {
        DynamicImage::ImageRgb8(buf) => Ok(buf),
        // Alpha is dropped; 16-bit and float data are scaled down
        other => Ok(other.to_rgb8()),
    }
}

/// Save an RGB image; the format follows the path extension
pub fn save_image(path: &Path, image: &RgbImage) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    image.save(path)?;
    Ok(())
}

/// Generate output filename based on input: `STEM_inspected.EXT`
pub fn generate_output_path(input: &Path, extension: Option<&str>) -> Result<PathBuf> {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Invalid input filename",
            ))
        })?;

    let parent = input.parent().unwrap_or_else(|| Path::new("."));

    let extension = match extension {
        Some(ext) => ext,
        None => input.extension().and_then(|s| s.to_str()).unwrap_or("png"),
    };

    Ok(parent.join(format!("{}_inspected.{}", stem, extension)))
}
