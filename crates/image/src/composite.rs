//! Decoding into RGBA and applying erase masks to the alpha channel.

use crate::mask::Mask;
use crate::{Result, StickerError};
use image::{DynamicImage, RgbaImage};

/// Decode raw upload bytes into an RGBA image.
///
/// Sources without alpha come back fully opaque.
pub fn decode(data: &[u8]) -> Result<RgbaImage> {
    let img = image::load_from_memory(data)?;
    tracing::debug!(
        width = img.width(),
        height = img.height(),
        color = ?img.color(),
        "Decoded source image"
    );
    let rgba = to_rgba(&img);
    ensure_non_empty(&rgba)?;
    Ok(rgba)
}

/// Convert any decoded image to 8-bit RGBA.
pub fn to_rgba(img: &DynamicImage) -> RgbaImage {
    match img {
        DynamicImage::ImageRgba8(rgba) => rgba.clone(),
        other => other.to_rgba8(),
    }
}

/// Wrap interleaved pixel data handed over by a caller.
///
/// Only four-channel data is accepted; anything else is an upstream bug
/// and is reported rather than converted.
pub fn from_raw(width: u32, height: u32, channels: u8, data: Vec<u8>) -> Result<RgbaImage> {
    if channels != 4 {
        return Err(StickerError::Shape(format!(
            "expected 4 interleaved channels, got {}",
            channels
        )));
    }
    let expected = width as usize * height as usize * 4;
    let len = data.len();
    let img = RgbaImage::from_raw(width, height, data).ok_or_else(|| {
        StickerError::Shape(format!(
            "{}x{} RGBA needs {} bytes, got {}",
            width, height, expected, len
        ))
    })?;
    ensure_non_empty(&img)?;
    Ok(img)
}

/// Set alpha to zero wherever `erase` is true. Color channels are untouched.
///
/// Applying the same mask twice gives the same image as applying it once.
pub fn apply(mut image: RgbaImage, erase: &Mask) -> Result<RgbaImage> {
    if image.dimensions() != (erase.width(), erase.height()) {
        return Err(StickerError::Shape(format!(
            "erase mask is {}x{} but image is {}x{}",
            erase.width(),
            erase.height(),
            image.width(),
            image.height()
        )));
    }

    for (pixel, &clear) in image.pixels_mut().zip(erase.as_slice()) {
        if clear {
            pixel.0[3] = 0;
        }
    }

    Ok(image)
}

/// Reject images without pixels.
pub(crate) fn ensure_non_empty(img: &RgbaImage) -> Result<()> {
    if img.width() == 0 || img.height() == 0 {
        return Err(StickerError::Shape(format!(
            "image has no pixels ({}x{})",
            img.width(),
            img.height()
        )));
    }
    Ok(())
}
