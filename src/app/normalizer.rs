//! Aspect-ratio-preserving image normalization
//!
//! Pages are resized to fit a fixed 600×800 portrait canvas. Sources taller
//! than wide are pinned to the canvas height, everything else to the canvas
//! width, and the other dimension follows the aspect ratio. Lanczos
//! resampling keeps the downscaled artwork free of visible aliasing.

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};

use crate::constants::canvas;

/// Resize an image to fit the device canvas, preserving aspect ratio
///
/// Returns the resized image together with its rendered height so the
/// assembler can anchor it vertically on the output page.
pub fn fit_to_device(image: &DynamicImage) -> (DynamicImage, u32) {
    let (width, height) = image.dimensions();
    let aspect_ratio = height as f64 / width as f64;

    let (target_width, target_height) = if aspect_ratio > 1.0 {
        (
            (canvas::HEIGHT as f64 / aspect_ratio).round() as u32,
            canvas::HEIGHT,
        )
    } else {
        (
            canvas::WIDTH,
            (canvas::WIDTH as f64 * aspect_ratio).round() as u32,
        )
    };

    let resized = image.resize_exact(target_width, target_height, FilterType::Lanczos3);
    (resized, target_height)
}
