//! Upload sniffing from declared content type and magic bytes.

use crate::{Result, StickerError};
use serde::{Deserialize, Serialize};

const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_SIGNATURE: [u8; 2] = [0xFF, 0xD8];

/// Image formats recognised from magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// JPEG image
    Jpeg,
    /// PNG image
    Png,
    /// GIF image
    Gif,
    /// WebP image
    WebP,
    /// BMP image
    Bmp,
}

impl ImageFormat {
    /// Get the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::Gif => "image/gif",
            ImageFormat::WebP => "image/webp",
            ImageFormat::Bmp => "image/bmp",
        }
    }
}

/// Detect image format from magic bytes.
///
/// # Example
/// ```
/// use stickerkit_image::{detect_format, ImageFormat};
///
/// let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
/// assert_eq!(detect_format(&png), Some(ImageFormat::Png));
/// assert_eq!(detect_format(b"hello"), None);
/// ```
pub fn detect_format(data: &[u8]) -> Option<ImageFormat> {
    if data.starts_with(&PNG_SIGNATURE) {
        Some(ImageFormat::Png)
    } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some(ImageFormat::Jpeg)
    } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        Some(ImageFormat::Gif)
    } else if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
        Some(ImageFormat::WebP)
    } else if data.starts_with(b"BM") {
        Some(ImageFormat::Bmp)
    } else {
        None
    }
}

/// Decide whether an upload may go on to decoding.
///
/// A declared `image/*` content type is trusted. Otherwise the bytes must
/// carry a PNG or JPEG signature. Decoding still has the final word.
pub fn sniff_upload(content_type: Option<&str>, data: &[u8]) -> Result<()> {
    if content_type.is_some_and(|ct| ct.starts_with("image/")) {
        return Ok(());
    }

    let declared = content_type.unwrap_or("none");
    if data.len() < PNG_SIGNATURE.len() {
        return Err(StickerError::InvalidUpload(format!(
            "File too small to be an image. Content type: {}",
            declared
        )));
    }

    if data.starts_with(&PNG_SIGNATURE) {
        tracing::info!("Detected PNG file from signature");
        Ok(())
    } else if data.starts_with(&JPEG_SIGNATURE) {
        tracing::info!("Detected JPEG file from signature");
        Ok(())
    } else {
        tracing::warn!(signature = ?&data[..8], "Unknown file signature");
        Err(StickerError::InvalidUpload(format!(
            "File must be an image. Content type: {}",
            declared
        )))
    }
}

/// Quick look at an upload without decoding it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadInspection {
    /// Upload size in bytes
    pub size: usize,
    /// Up to the first eight bytes, as `0x..` strings
    pub first_bytes: Vec<String>,
    /// Starts with the PNG signature
    pub is_png: bool,
    /// Starts with the JPEG SOI marker
    pub is_jpeg: bool,
    /// Format recognised from magic bytes
    pub format: Option<ImageFormat>,
}

/// Describe an upload for debugging.
pub fn inspect_upload(data: &[u8]) -> UploadInspection {
    let long_enough = data.len() >= PNG_SIGNATURE.len();
    UploadInspection {
        size: data.len(),
        first_bytes: if long_enough {
            data[..8].iter().map(|b| format!("{:#x}", b)).collect()
        } else {
            Vec::new()
        },
        is_png: long_enough && data.starts_with(&PNG_SIGNATURE),
        is_jpeg: data.starts_with(&JPEG_SIGNATURE),
        format: detect_format(data),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_formats() {
        assert_eq!(
            detect_format(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00]),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(detect_format(b"GIF89a\x00\x00"), Some(ImageFormat::Gif));
        assert_eq!(detect_format(b"RIFF\x00\x00\x00\x00WEBP"), Some(ImageFormat::WebP));
        assert_eq!(detect_format(&[0x00, 0x00, 0x00, 0x00]), None);
    }

    #[test]
    fn test_declared_image_type_is_trusted() {
        assert!(sniff_upload(Some("image/png"), b"").is_ok());
    }

    #[test]
    fn test_signature_accepts_png_and_jpeg() {
        assert!(sniff_upload(None, &PNG_SIGNATURE).is_ok());
        assert!(sniff_upload(Some("application/octet-stream"), &[0xFF, 0xD8, 0, 0, 0, 0, 0, 0]).is_ok());
    }

    #[test]
    fn test_short_upload_rejected() {
        let err = sniff_upload(None, &[0x89, 0x50]).unwrap_err();
        assert!(err.to_string().contains("too small"));
    }

    #[test]
    fn test_unknown_signature_rejected() {
        let err = sniff_upload(Some("text/plain"), b"GIF89a\x00\x00\x00").unwrap_err();
        assert!(matches!(err, StickerError::InvalidUpload(_)));
        assert!(err.to_string().contains("text/plain"));
    }

    #[test]
    fn test_inspect_upload() {
        let inspection = inspect_upload(&PNG_SIGNATURE);
        assert_eq!(inspection.size, 8);
        assert_eq!(inspection.first_bytes[0], "0x89");
        assert!(inspection.is_png);
        assert!(!inspection.is_jpeg);
        assert_eq!(inspection.format, Some(ImageFormat::Png));

        let short = inspect_upload(&[0xFF, 0xD8]);
        assert!(short.first_bytes.is_empty());
        assert!(short.is_jpeg);
    }
}
