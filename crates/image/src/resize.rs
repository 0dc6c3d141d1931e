//! Image resampling with the image crate.

use crate::{Result, StickerError};
use image::RgbaImage;
use image::imageops::{self, FilterType};

/// Default sticker edge length in pixels.
pub const DEFAULT_OUTPUT_SIZE: u32 = 512;

/// Resample `image` to exactly `width` x `height` with a Lanczos3 filter.
///
/// All four channels are interpolated independently, so erased edges pick
/// up intermediate alpha values. Aspect ratio is not preserved.
pub fn resize(image: &RgbaImage, width: u32, height: u32) -> Result<RgbaImage> {
    if width == 0 || height == 0 {
        return Err(StickerError::InvalidOptions(format!(
            "target dimensions must be non-zero, got {}x{}",
            width, height
        )));
    }

    if image.dimensions() == (width, height) {
        return Ok(image.clone());
    }

    Ok(imageops::resize(image, width, height, FilterType::Lanczos3))
}

/// Resample to a `size` x `size` square.
pub fn resize_square(image: &RgbaImage, size: u32) -> Result<RgbaImage> {
    resize(image, size, size)
}
