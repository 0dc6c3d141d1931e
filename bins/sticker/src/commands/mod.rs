//! Subcommand implementations

pub mod analyze;
pub mod batch;
pub mod inspect;
pub mod make;

use anyhow::Context;
use std::path::{Path, PathBuf};
use stickerkit_image::StickerReport;
use stickerkit_telemetry::{metrics, names};

pub(crate) fn read_input(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// `sticker-<stem>.webp` placed in `dir`, or next to `input`.
pub(crate) fn default_output(input: &Path, dir: Option<&Path>, file_name: &str) -> PathBuf {
    let dir = dir
        .map(Path::to_path_buf)
        .or_else(|| input.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    dir.join(file_name)
}

pub(crate) fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Count one finished sticker in the process metrics.
pub(crate) fn record_sticker(report: &StickerReport) {
    let registry = metrics();
    registry.increment(names::STICKERS_ENCODED);
    if !report.budget_met {
        registry.increment(names::BUDGET_MISSES);
    }
    if report.background.strategy.is_degraded() {
        registry.increment(names::DEGRADED_MASKS);
    }
}
