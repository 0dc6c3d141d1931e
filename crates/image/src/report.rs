//! Pipeline metadata.

use crate::background::{MaskStrategy, RegionStats, RemovalMode};
use crate::encode::EncodeAttempt;
use serde::{Deserialize, Serialize};

/// What background removal did to one image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackgroundReport {
    /// Source width in pixels
    pub width: u32,
    /// Source height in pixels
    pub height: u32,
    /// Requested removal mode
    pub mode: RemovalMode,
    /// Strategy that actually ran
    pub strategy: MaskStrategy,
    /// Pixels passing the near-white test
    pub near_white_pixels: usize,
    /// Pixels whose alpha was set to zero
    pub erased_pixels: usize,
    /// Near-white pixels left opaque
    pub preserved_pixels: usize,
    /// Labeling statistics, when labeling ran
    pub regions: Option<RegionStats>,
}

impl BackgroundReport {
    /// Total pixel count of the source.
    pub fn total_pixels(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Share of the source that became transparent, 0.0 to 1.0.
    pub fn erased_ratio(&self) -> f64 {
        self.erased_pixels as f64 / self.total_pixels() as f64
    }
}

/// Everything the caller needs besides the encoded bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StickerReport {
    /// Background removal summary
    pub background: BackgroundReport,
    /// Output width in pixels
    pub output_width: u32,
    /// Output height in pixels
    pub output_height: u32,
    /// Codec name, upper case
    pub format: String,
    /// MIME type of the encoded bytes
    pub mime_type: String,
    /// Chosen encoder quality
    pub quality: u8,
    /// Size of the encoded bytes
    pub byte_length: usize,
    /// Budget the search aimed for
    pub byte_budget: usize,
    /// Whether the output is under the budget
    pub budget_met: bool,
    /// Every encode attempt, in order
    pub attempts: Vec<EncodeAttempt>,
}

impl StickerReport {
    /// Output dimensions as `WIDTHxHEIGHT`.
    pub fn dimensions(&self) -> String {
        format!("{}x{}", self.output_width, self.output_height)
    }

    /// Suggested download name for a source called `stem`.
    pub fn file_name(&self, stem: &str) -> String {
        sticker_file_name(stem, &self.format.to_lowercase())
    }
}

/// `sticker-{stem}.{extension}`, with `image` standing in for an empty stem.
pub(crate) fn sticker_file_name(stem: &str, extension: &str) -> String {
    let stem = if stem.is_empty() { "image" } else { stem };
    format!("sticker-{}.{}", stem, extension)
}
