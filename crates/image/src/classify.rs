//! Near-white pixel classification.

use crate::mask::Mask;
use image::{Rgba, RgbaImage};

/// Default threshold: a channel must exceed 240 to count as white.
pub const DEFAULT_WHITE_THRESHOLD: u8 = 240;

/// Whether all three color channels exceed `threshold`. Alpha is ignored.
#[inline]
pub fn is_near_white(pixel: &Rgba<u8>, threshold: u8) -> bool {
    let Rgba([r, g, b, _]) = *pixel;
    r > threshold && g > threshold && b > threshold
}

/// Build the near-white mask for `image`.
///
/// # Example
/// ```
/// use image::{Rgba, RgbaImage};
/// use stickerkit_image::classify;
///
/// let mut img = RgbaImage::from_pixel(2, 1, Rgba([255, 255, 255, 255]));
/// img.put_pixel(1, 0, Rgba([250, 250, 200, 255]));
///
/// let mask = classify(&img, 240);
/// assert!(mask.get(0, 0));
/// assert!(!mask.get(1, 0));
/// ```
pub fn classify(image: &RgbaImage, threshold: u8) -> Mask {
    let cells = image
        .pixels()
        .map(|pixel| is_near_white(pixel, threshold))
        .collect();

    // `pixels()` yields exactly width * height items in row-major order
    Mask::from_parts(image.width(), image.height(), cells)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_is_strict() {
        let px = Rgba([240, 241, 255, 255]);
        assert!(!is_near_white(&px, 240));
        assert!(is_near_white(&px, 239));
    }

    #[test]
    fn test_alpha_ignored() {
        assert!(is_near_white(&Rgba([255, 255, 255, 0]), 240));
    }

    #[test]
    fn test_threshold_255_matches_nothing() {
        let img = RgbaImage::from_pixel(3, 3, Rgba([255, 255, 255, 255]));
        assert!(!classify(&img, 255).any());
    }

    #[test]
    fn test_classify_layout() {
        let mut img = RgbaImage::from_pixel(3, 2, Rgba([0, 0, 0, 255]));
        img.put_pixel(2, 1, Rgba([255, 255, 255, 255]));
        let mask = classify(&img, DEFAULT_WHITE_THRESHOLD);
        assert_eq!(mask.count(), 1);
        assert!(mask.get(2, 1));
    }
}
