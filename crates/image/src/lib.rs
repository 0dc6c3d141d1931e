//! Sticker engine for Stickerkit.
//!
//! Turns an arbitrary raster image into a square sticker with a transparent
//! background:
//! - Near-white pixel classification
//! - Connected component labeling and border-region detection
//! - Erase-mask construction (border-connected, naive threshold, morphological)
//! - Alpha compositing and Lanczos resampling
//! - Lossy WebP encoding under a byte budget
//!
//! # Example
//!
//! ```no_run
//! use stickerkit_image::{StickerOptions, StickerPipeline};
//!
//! let data = std::fs::read("logo.png")?;
//! let pipeline = StickerPipeline::new(StickerOptions::default())?;
//! let sticker = pipeline.process_bytes(&data)?;
//! std::fs::write(sticker.report.file_name("logo"), sticker.bytes())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]

pub mod background;
mod classify;
pub mod composite;
mod config;
mod detect;
pub mod encode;
mod error;
pub mod label;
mod mask;
#[cfg(feature = "morphology")]
pub mod morphology;
pub mod pipeline;
mod report;
mod resize;

pub use background::{
    build_erase_mask, EraseOutcome, MaskBuilder, MaskStrategy, RegionStats, RemovalMode,
};
pub use classify::{classify, is_near_white, DEFAULT_WHITE_THRESHOLD};
pub use config::{LogFormat, LoggingConfig, StickerConfig, StickerOptions, CONFIG_CANDIDATES};
pub use detect::{detect_format, inspect_upload, sniff_upload, ImageFormat, UploadInspection};
pub use encode::{
    EncodeAttempt, EncodedArtifact, QualityCodec, SizeConstrainedEncoder, WebpCodec,
    DEFAULT_BYTE_BUDGET, DEFAULT_QUALITY_CANDIDATES,
};
pub use error::{Result, StickerError};
pub use label::{label, BorderRegions, Connectivity, LabelGrid};
pub use mask::Mask;
pub use pipeline::{compare_modes, remove_background, Sticker, StickerPipeline};
pub use report::{BackgroundReport, StickerReport};
pub use resize::{resize, resize_square, DEFAULT_OUTPUT_SIZE};
