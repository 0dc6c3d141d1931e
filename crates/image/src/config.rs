//! Request options and configuration file loading.

use crate::background::{DEFAULT_FALLBACK_MARGIN, MaskBuilder, RemovalMode};
use crate::classify::DEFAULT_WHITE_THRESHOLD;
use crate::encode::{DEFAULT_BYTE_BUDGET, DEFAULT_QUALITY_CANDIDATES};
use crate::label::Connectivity;
use crate::resize::DEFAULT_OUTPUT_SIZE;
use crate::{Result, StickerError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Per-request parameters of the sticker pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StickerOptions {
    /// Channel value every color channel must exceed to count as white
    pub white_threshold: u8,
    /// Edge length of the square output
    pub output_size: u32,
    /// Encoder qualities, tried in order
    pub quality_candidates: Vec<u8>,
    /// Output must be strictly smaller than this many bytes
    pub byte_budget: usize,
    /// Background removal mode
    pub mode: RemovalMode,
    /// Neighborhood used by the labeler
    pub connectivity: Connectivity,
    /// Seed margin of the margin-growth fallback
    pub fallback_margin: u32,
}

impl Default for StickerOptions {
    fn default() -> Self {
        Self {
            white_threshold: DEFAULT_WHITE_THRESHOLD,
            output_size: DEFAULT_OUTPUT_SIZE,
            quality_candidates: DEFAULT_QUALITY_CANDIDATES.to_vec(),
            byte_budget: DEFAULT_BYTE_BUDGET,
            mode: RemovalMode::default(),
            connectivity: Connectivity::default(),
            fallback_margin: DEFAULT_FALLBACK_MARGIN,
        }
    }
}

impl StickerOptions {
    /// Encode once at `quality`; the budget is still reported but cannot
    /// change the outcome.
    pub fn single_quality(quality: u8) -> Self {
        Self {
            quality_candidates: vec![quality],
            ..Self::default()
        }
    }

    /// Same options with another removal mode.
    pub fn with_mode(mut self, mode: RemovalMode) -> Self {
        self.mode = mode;
        self
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.output_size == 0 {
            return Err(StickerError::InvalidOptions(
                "output_size must be positive".to_string(),
            ));
        }
        // libwebp refuses anything larger
        if self.output_size > 16383 {
            return Err(StickerError::InvalidOptions(format!(
                "output_size {} exceeds the WebP limit of 16383",
                self.output_size
            )));
        }
        if self.quality_candidates.is_empty() {
            return Err(StickerError::InvalidOptions(
                "quality_candidates must not be empty".to_string(),
            ));
        }
        if let Some(q) = self.quality_candidates.iter().find(|&&q| q > 100) {
            return Err(StickerError::InvalidOptions(format!(
                "quality {} is outside 0-100",
                q
            )));
        }
        if self.byte_budget == 0 {
            return Err(StickerError::InvalidOptions(
                "byte_budget must be positive".to_string(),
            ));
        }
        if self.fallback_margin == 0 {
            return Err(StickerError::InvalidOptions(
                "fallback_margin must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Mask builder configured from these options.
    pub fn mask_builder(&self) -> MaskBuilder {
        MaskBuilder {
            mode: self.mode,
            connectivity: self.connectivity,
            fallback_margin: self.fallback_margin,
        }
    }
}

/// Logging section of the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
    /// Line format of log output
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable single lines
    #[default]
    Compact,
    /// One JSON object per event
    Json,
}

/// Root of `stickerkit.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StickerConfig {
    /// Pipeline defaults
    #[serde(default)]
    pub sticker: StickerOptions,

    /// Logging defaults
    #[serde(default)]
    pub logging: LoggingConfig,

    /// File the configuration came from, if any
    #[serde(skip)]
    pub path: Option<PathBuf>,
}

/// Locations searched when no explicit config path is given.
pub const CONFIG_CANDIDATES: [&str; 3] = [
    ".stickerkit.toml",
    "stickerkit.toml",
    ".config/stickerkit.toml",
];

impl StickerConfig {
    /// Load from `path`, else the first existing candidate file, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = path.map(Path::to_path_buf).or_else(find_config_file);

        let mut config = match config_path {
            Some(ref p) => load_config_file(p)?,
            None => StickerConfig::default(),
        };
        config.sticker.validate()?;
        config.path = config_path;
        Ok(config)
    }

    /// Parse TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: StickerConfig = toml::from_str(content)
            .map_err(|e| StickerError::Config(format!("Failed to parse config: {}", e)))?;
        config.sticker.validate()?;
        Ok(config)
    }
}

fn find_config_file() -> Option<PathBuf> {
    CONFIG_CANDIDATES
        .iter()
        .map(PathBuf::from)
        .find(|candidate| candidate.exists())
}

fn load_config_file(path: &Path) -> Result<StickerConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        StickerError::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;

    toml::from_str(&content).map_err(|e| {
        StickerError::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}
