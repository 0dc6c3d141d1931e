//! Size-constrained lossy encoding.
//!
//! [`SizeConstrainedEncoder`] walks a fixed list of quality levels, highest
//! first, and keeps the first encoding that fits under the byte budget. Codec
//! output size is not guaranteed to shrink with quality, so the list is tried
//! in the given order rather than bisected. When nothing fits, the output of
//! the last candidate is returned anyway and flagged as over budget.

use crate::{Result, StickerError};
use image::RgbaImage;
use serde::{Deserialize, Serialize};

/// Quality ladder used for stickers.
pub const DEFAULT_QUALITY_CANDIDATES: [u8; 6] = [90, 80, 70, 60, 50, 40];

/// Default byte budget (100 KiB).
pub const DEFAULT_BYTE_BUDGET: usize = 100 * 1024;

/// A lossy codec that can encode an RGBA image at a given quality.
pub trait QualityCodec {
    /// Short codec name for logs and reports.
    fn name(&self) -> &'static str;

    /// MIME type of the produced bytes.
    fn mime_type(&self) -> &'static str;

    /// Encode `image` at `quality` (0-100).
    fn encode(&self, image: &RgbaImage, quality: u8) -> Result<Vec<u8>>;
}

/// Single-frame lossy WebP through libwebp.
#[derive(Debug, Clone, Copy)]
pub struct WebpCodec {
    /// Compression effort, 0 (fast) to 6 (smallest)
    pub method: i32,
}

impl Default for WebpCodec {
    fn default() -> Self {
        Self { method: 6 }
    }
}

impl QualityCodec for WebpCodec {
    fn name(&self) -> &'static str {
        "webp"
    }

    fn mime_type(&self) -> &'static str {
        "image/webp"
    }

    fn encode(&self, image: &RgbaImage, quality: u8) -> Result<Vec<u8>> {
        let mut config = libwebp_sys::WebPConfig::new()
            .map_err(|_| StickerError::Encode("libwebp rejected the default config".to_string()))?;
        config.lossless = 0;
        config.quality = f32::from(quality.min(100));
        config.method = self.method.clamp(0, 6);
        // keep RGB under transparent pixels free so it compresses
        config.exact = 0;

        let encoder = webp::Encoder::from_rgba(image.as_raw(), image.width(), image.height());
        let memory = encoder
            .encode_advanced(&config)
            .map_err(|e| StickerError::Encode(format!("libwebp: {:?}", e)))?;

        Ok(memory.to_vec())
    }
}

/// One encode attempt of the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodeAttempt {
    /// Quality requested from the codec
    pub quality: u8,
    /// Size of the output
    pub byte_length: usize,
}

/// The chosen encoding of one request.
#[derive(Debug, Clone)]
pub struct EncodedArtifact {
    /// Encoded image
    pub bytes: Vec<u8>,
    /// Quality that produced `bytes`
    pub quality: u8,
    /// Length of `bytes`
    pub byte_length: usize,
    /// Whether `byte_length` is under the budget
    pub budget_met: bool,
    /// Every attempt in the order tried; the last one is the chosen output
    pub attempts: Vec<EncodeAttempt>,
}

/// Searches a quality ladder for an encoding under a byte budget.
#[derive(Debug, Clone)]
pub struct SizeConstrainedEncoder<C = WebpCodec> {
    codec: C,
    byte_budget: usize,
    quality_candidates: Vec<u8>,
}

impl Default for SizeConstrainedEncoder<WebpCodec> {
    fn default() -> Self {
        Self {
            codec: WebpCodec::default(),
            byte_budget: DEFAULT_BYTE_BUDGET,
            quality_candidates: DEFAULT_QUALITY_CANDIDATES.to_vec(),
        }
    }
}

impl<C: QualityCodec> SizeConstrainedEncoder<C> {
    /// Create an encoder; fails on an empty ladder, a quality above 100, or
    /// a zero budget.
    pub fn new(codec: C, byte_budget: usize, quality_candidates: Vec<u8>) -> Result<Self> {
        if quality_candidates.is_empty() {
            return Err(StickerError::InvalidOptions(
                "at least one quality candidate is required".to_string(),
            ));
        }
        if let Some(q) = quality_candidates.iter().find(|&&q| q > 100) {
            return Err(StickerError::InvalidOptions(format!(
                "quality {} is outside 0-100",
                q
            )));
        }
        if byte_budget == 0 {
            return Err(StickerError::InvalidOptions(
                "byte budget must be positive".to_string(),
            ));
        }

        Ok(Self {
            codec,
            byte_budget,
            quality_candidates,
        })
    }

    /// The underlying codec.
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Budget an output must stay under.
    pub fn byte_budget(&self) -> usize {
        self.byte_budget
    }

    /// Candidate qualities in try order.
    pub fn quality_candidates(&self) -> &[u8] {
        &self.quality_candidates
    }

    /// Encode `image` at each candidate until one is strictly smaller than
    /// the budget. Codec errors abort the search.
    pub fn encode_within_budget(&self, image: &RgbaImage) -> Result<EncodedArtifact> {
        let mut attempts = Vec::with_capacity(self.quality_candidates.len());
        let mut last = None;

        for &quality in &self.quality_candidates {
            let bytes = self.codec.encode(image, quality)?;
            let byte_length = bytes.len();
            attempts.push(EncodeAttempt { quality, byte_length });
            tracing::debug!(
                codec = self.codec.name(),
                quality,
                bytes = byte_length,
                budget = self.byte_budget,
                "Encode attempt"
            );

            let fits = byte_length < self.byte_budget;
            last = Some((bytes, quality));
            if fits {
                break;
            }
        }

        // the ladder is non-empty, so at least one attempt ran
        let (bytes, quality) = last.ok_or_else(|| {
            StickerError::InvalidOptions("no quality candidates to try".to_string())
        })?;
        let byte_length = bytes.len();
        let budget_met = byte_length < self.byte_budget;

        if budget_met {
            tracing::info!(quality, bytes = byte_length, "Encoded within budget");
        } else {
            tracing::warn!(
                quality,
                bytes = byte_length,
                budget = self.byte_budget,
                "No quality candidate met the byte budget, returning last attempt"
            );
        }

        Ok(EncodedArtifact {
            bytes,
            quality,
            byte_length,
            budget_met,
            attempts,
        })
    }
}
