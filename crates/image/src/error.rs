//! Error types for the sticker engine.

use thiserror::Error;

/// Result type alias for sticker operations.
pub type Result<T> = std::result::Result<T, StickerError>;

/// Errors that can occur while turning an upload into a sticker.
#[derive(Debug, Error)]
pub enum StickerError {
    /// Input bytes are not a decodable image
    #[error("Invalid image file: {0}")]
    Decode(String),

    /// Pixel data does not have the layout the engine requires
    #[error("Shape mismatch: {0}")]
    Shape(String),

    /// Connected component labeling could not run
    #[error("Connected component labeling unavailable: {0}")]
    LabelingUnavailable(String),

    /// The codec refused to encode the image
    #[error("Encoding failed: {0}")]
    Encode(String),

    /// Request parameters outside their valid range
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// Upload rejected before decoding
    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    /// Configuration file could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StickerError {
    /// Whether the failure came from the request itself rather than the engine.
    ///
    /// The surrounding service maps these to client errors.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            StickerError::Decode(_) | StickerError::InvalidUpload(_) | StickerError::InvalidOptions(_)
        )
    }
}

impl From<image::ImageError> for StickerError {
    fn from(err: image::ImageError) -> Self {
        StickerError::Decode(err.to_string())
    }
}
