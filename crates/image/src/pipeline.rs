//! End-to-end sticker pipeline.
//!
//! decode -> classify -> erase mask -> composite -> resize -> encode.
//! Each call owns its buffers; a pipeline value holds only configuration and
//! can be shared across threads that process different uploads.

use crate::background::MaskStrategy;
use crate::classify::classify;
use crate::composite;
use crate::config::StickerOptions;
use crate::detect::sniff_upload;
use crate::encode::{EncodedArtifact, QualityCodec, SizeConstrainedEncoder, WebpCodec};
use crate::report::{sticker_file_name, BackgroundReport, StickerReport};
use crate::resize::resize_square;
use crate::Result;
use image::RgbaImage;

/// An encoded sticker plus its metadata.
#[derive(Debug, Clone)]
pub struct Sticker {
    /// Encoder output
    pub artifact: EncodedArtifact,
    /// Pipeline metadata
    pub report: StickerReport,
}

impl Sticker {
    /// The encoded bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.artifact.bytes
    }

    /// Take ownership of the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.artifact.bytes
    }
}

/// Turns uploads into stickers with fixed options.
#[derive(Debug, Clone)]
pub struct StickerPipeline<C = WebpCodec> {
    options: StickerOptions,
    encoder: SizeConstrainedEncoder<C>,
}

impl StickerPipeline<WebpCodec> {
    /// Pipeline encoding lossy WebP.
    pub fn new(options: StickerOptions) -> Result<Self> {
        Self::with_codec(options, WebpCodec::default())
    }
}

impl<C: QualityCodec> StickerPipeline<C> {
    /// Pipeline encoding with `codec`.
    pub fn with_codec(options: StickerOptions, codec: C) -> Result<Self> {
        options.validate()?;
        let encoder = SizeConstrainedEncoder::new(
            codec,
            options.byte_budget,
            options.quality_candidates.clone(),
        )?;
        Ok(Self { options, encoder })
    }

    /// Options this pipeline runs with.
    pub fn options(&self) -> &StickerOptions {
        &self.options
    }

    /// Output file name for a source called `stem`, known before processing.
    pub fn file_name(&self, stem: &str) -> String {
        sticker_file_name(stem, self.encoder.codec().name())
    }

    /// Sniff, decode and process an upload.
    pub fn process_upload(&self, content_type: Option<&str>, data: &[u8]) -> Result<Sticker> {
        sniff_upload(content_type, data)?;
        self.process_bytes(data)
    }

    /// Decode and process raw image bytes.
    pub fn process_bytes(&self, data: &[u8]) -> Result<Sticker> {
        tracing::info!(bytes = data.len(), "Processing image");
        let image = composite::decode(data)?;
        self.process_image(image)
    }

    /// Process an already decoded image.
    ///
    /// Fails with [`crate::StickerError::Shape`] on an image without pixels.
    pub fn process_image(&self, image: RgbaImage) -> Result<Sticker> {
        composite::ensure_non_empty(&image)?;
        let _span = tracing::info_span!(
            "sticker",
            width = image.width(),
            height = image.height(),
            mode = %self.options.mode
        )
        .entered();

        let (composited, background) = self.remove_background(image)?;
        let resized = resize_square(&composited, self.options.output_size)?;
        let artifact = self.encoder.encode_within_budget(&resized)?;

        let codec = self.encoder.codec();
        let report = StickerReport {
            background,
            output_width: resized.width(),
            output_height: resized.height(),
            format: codec.name().to_uppercase(),
            mime_type: codec.mime_type().to_string(),
            quality: artifact.quality,
            byte_length: artifact.byte_length,
            byte_budget: self.encoder.byte_budget(),
            budget_met: artifact.budget_met,
            attempts: artifact.attempts.clone(),
        };

        tracing::info!(
            quality = report.quality,
            bytes = report.byte_length,
            erased = report.background.erased_pixels,
            "Sticker ready"
        );

        Ok(Sticker { artifact, report })
    }

    /// Make the background transparent without resizing or encoding.
    ///
    /// An image without near-white pixels comes back untouched.
    pub fn remove_background(&self, image: RgbaImage) -> Result<(RgbaImage, BackgroundReport)> {
        remove_background(image, &self.options)
    }
}

/// Make the background of `image` transparent under `options`.
pub fn remove_background(
    image: RgbaImage,
    options: &StickerOptions,
) -> Result<(RgbaImage, BackgroundReport)> {
    composite::ensure_non_empty(&image)?;
    let (width, height) = image.dimensions();
    let near_white = classify(&image, options.white_threshold);

    let outcome = options.mask_builder().build(&near_white);
    let mut report = BackgroundReport {
        width,
        height,
        mode: options.mode,
        strategy: outcome.strategy,
        near_white_pixels: near_white.count(),
        erased_pixels: 0,
        preserved_pixels: 0,
        regions: outcome.regions,
    };

    if outcome.strategy == MaskStrategy::NothingToErase {
        tracing::debug!("No near-white pixels, leaving image untouched");
        return Ok((image, report));
    }

    report.erased_pixels = outcome.mask.count();
    report.preserved_pixels = near_white.count_and_not(&outcome.mask);
    tracing::debug!(
        strategy = ?report.strategy,
        near_white = report.near_white_pixels,
        erased = report.erased_pixels,
        preserved = report.preserved_pixels,
        "Background mask built"
    );

    let composited = composite::apply(image, &outcome.mask)?;
    Ok((composited, report))
}

/// Run background removal under every mode for side-by-side comparison.
pub fn compare_modes(image: &RgbaImage, options: &StickerOptions) -> Result<Vec<BackgroundReport>> {
    crate::background::RemovalMode::ALL
        .into_iter()
        .map(|mode| {
            let options = options.clone().with_mode(mode);
            remove_background(image.clone(), &options).map(|(_, report)| report)
        })
        .collect()
}
