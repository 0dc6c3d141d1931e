//! Erase-mask construction.
//!
//! Turns a near-white mask into the set of pixels that become transparent.
//! The caller picks one [`RemovalMode`] per request:
//!
//! - **border-connected**: erase the near-white regions that touch the image
//!   border; enclosed white content survives. Needs the labeler, and falls
//!   back to margin growth when labeling is unavailable.
//! - **naive-threshold**: erase every near-white pixel.
//! - **morphological**: erase the near-white mask as it stands after a 3x3
//!   closing and opening pass. Closing can pull small gaps into the mask.
//!
//! # Margin growth
//!
//! The degraded border-connected strategy seeds every near-white pixel within
//! `margin` pixels of an edge and grows the set through 8-adjacent near-white
//! pixels until nothing changes. It can disagree with true labeling: a white
//! blob that comes within the margin without touching the edge is erased
//! too. That is accepted; the result is always a superset of the labeled
//! erase mask.

use crate::label::{self, Connectivity};
use crate::mask::Mask;
use crate::{Result, StickerError};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

/// Seed margin of the margin-growth fallback, in pixels.
pub const DEFAULT_FALLBACK_MARGIN: u32 = 5;

/// How near-white pixels are turned into background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RemovalMode {
    /// Erase near-white regions connected to the border
    #[default]
    BorderConnected,
    /// Erase every near-white pixel
    NaiveThreshold,
    /// Erase the morphologically cleaned near-white mask
    Morphological,
}

impl RemovalMode {
    /// Every mode, in documentation order.
    pub const ALL: [RemovalMode; 3] = [
        RemovalMode::BorderConnected,
        RemovalMode::NaiveThreshold,
        RemovalMode::Morphological,
    ];

    /// Kebab-case name as used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            RemovalMode::BorderConnected => "border-connected",
            RemovalMode::NaiveThreshold => "naive-threshold",
            RemovalMode::Morphological => "morphological",
        }
    }
}

impl fmt::Display for RemovalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RemovalMode {
    type Err = StickerError;

    fn from_str(s: &str) -> Result<Self> {
        RemovalMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| StickerError::InvalidOptions(format!("unknown removal mode: {}", s)))
    }
}

/// The algorithm that actually produced an erase mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MaskStrategy {
    /// No near-white pixels; nothing was computed
    NothingToErase,
    /// Border regions from connected component labeling
    Labeled,
    /// Margin seeds grown through adjacent near-white pixels
    MarginGrowth,
    /// Every near-white pixel
    Threshold,
    /// Cleaned mask from closing and opening
    Morphological,
    /// Morphological mode requested but unavailable; plain threshold used
    ThresholdFallback,
}

impl MaskStrategy {
    /// Whether a requested capability was missing and a substitute ran.
    pub fn is_degraded(&self) -> bool {
        matches!(self, MaskStrategy::MarginGrowth | MaskStrategy::ThresholdFallback)
    }
}

/// An erase mask plus how it was obtained.
#[derive(Debug, Clone)]
pub struct EraseOutcome {
    /// True where alpha is forced to zero
    pub mask: Mask,
    /// Algorithm that produced `mask`
    pub strategy: MaskStrategy,
    /// Region statistics when labeling ran
    pub regions: Option<RegionStats>,
}

/// Labeling summary for observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionStats {
    /// Connected near-white regions
    pub region_count: u32,
    /// Of those, regions touching the border
    pub border_regions: usize,
}

/// Builds erase masks for one removal mode.
#[derive(Debug, Clone, Copy)]
pub struct MaskBuilder {
    /// Removal mode
    pub mode: RemovalMode,
    /// Neighborhood for labeling
    pub connectivity: Connectivity,
    /// Seed margin of the margin-growth fallback
    pub fallback_margin: u32,
}

impl Default for MaskBuilder {
    fn default() -> Self {
        Self::new(RemovalMode::default())
    }
}

impl MaskBuilder {
    /// Builder for `mode` with eight-connectivity and the default margin.
    pub fn new(mode: RemovalMode) -> Self {
        Self {
            mode,
            connectivity: Connectivity::Eight,
            fallback_margin: DEFAULT_FALLBACK_MARGIN,
        }
    }

    /// Compute the erase mask for `near_white`.
    pub fn build(&self, near_white: &Mask) -> EraseOutcome {
        if !near_white.any() {
            return EraseOutcome {
                mask: Mask::filled(near_white.width(), near_white.height(), false),
                strategy: MaskStrategy::NothingToErase,
                regions: None,
            };
        }

        match self.mode {
            RemovalMode::BorderConnected => self.build_border_connected(near_white),
            RemovalMode::NaiveThreshold => EraseOutcome {
                mask: near_white.clone(),
                strategy: MaskStrategy::Threshold,
                regions: None,
            },
            RemovalMode::Morphological => build_morphological(near_white),
        }
    }

    fn build_border_connected(&self, near_white: &Mask) -> EraseOutcome {
        match border_connected_mask(near_white, self.connectivity) {
            Ok((mask, regions)) => EraseOutcome {
                mask,
                strategy: MaskStrategy::Labeled,
                regions: Some(regions),
            },
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    margin = self.fallback_margin,
                    "Falling back to margin growth for background detection"
                );
                EraseOutcome {
                    mask: margin_growth_mask(near_white, self.fallback_margin),
                    strategy: MaskStrategy::MarginGrowth,
                    regions: None,
                }
            }
        }
    }
}

/// Compute the erase mask for `near_white` under `mode` with default settings.
pub fn build_erase_mask(near_white: &Mask, mode: RemovalMode) -> EraseOutcome {
    MaskBuilder::new(mode).build(near_white)
}

/// Erase exactly the labeled regions that touch the border.
///
/// Fails with [`StickerError::LabelingUnavailable`] when the labeler cannot
/// run.
pub fn border_connected_mask(
    near_white: &Mask,
    connectivity: Connectivity,
) -> Result<(Mask, RegionStats)> {
    let grid = label::label(near_white, connectivity)?;
    let border = grid.border_regions();

    let cells = grid.labels().iter().map(|&id| border.contains(id)).collect();
    let stats = RegionStats {
        region_count: grid.region_count(),
        border_regions: border.len(),
    };

    Ok((Mask::from_parts(grid.width(), grid.height(), cells), stats))
}

/// Seed near-white pixels within `margin` of an edge, then close the set
/// under 8-adjacency through near-white pixels.
///
/// Every near-white pixel enters the worklist at most once.
pub fn margin_growth_mask(near_white: &Mask, margin: u32) -> Mask {
    let (w, h) = (near_white.width(), near_white.height());
    // the outermost ring always seeds
    let margin = margin.max(1);
    let mut erase = Mask::filled(w, h, false);
    let mut frontier = VecDeque::new();

    for y in 0..h {
        for x in 0..w {
            let near_edge = x < margin
                || y < margin
                || x >= w.saturating_sub(margin)
                || y >= h.saturating_sub(margin);
            if near_edge && near_white.get(x, y) {
                erase.set(x, y, true);
                frontier.push_back((x, y));
            }
        }
    }

    while let Some((x, y)) = frontier.pop_front() {
        for ny in y.saturating_sub(1)..=(y + 1).min(h - 1) {
            for nx in x.saturating_sub(1)..=(x + 1).min(w - 1) {
                if near_white.get(nx, ny) && !erase.get(nx, ny) {
                    erase.set(nx, ny, true);
                    frontier.push_back((nx, ny));
                }
            }
        }
    }

    erase
}

#[cfg(feature = "morphology")]
fn build_morphological(near_white: &Mask) -> EraseOutcome {
    EraseOutcome {
        mask: crate::morphology::clean(near_white),
        strategy: MaskStrategy::Morphological,
        regions: None,
    }
}

#[cfg(not(feature = "morphology"))]
fn build_morphological(near_white: &Mask) -> EraseOutcome {
    tracing::warn!("Morphological cleanup not available in this build, using plain threshold");
    EraseOutcome {
        mask: near_white.clone(),
        strategy: MaskStrategy::ThresholdFallback,
        regions: None,
    }
}
