//! Terminal output utilities

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::time::Duration;
use stickerkit_image::{BackgroundReport, StickerReport};

/// Status message helpers
pub struct Status;

impl Status {
    /// Print a success message
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Print an error message
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print an info message
    pub fn info(message: &str) {
        println!("{} {}", "ℹ".blue(), message);
    }

    /// Print a header
    pub fn header(message: &str) {
        println!();
        println!("{}", message.bold());
        println!("{}", "─".repeat(message.chars().count()));
    }
}

/// Print a one-image sticker summary
pub fn print_sticker(report: &StickerReport) {
    let bg = &report.background;
    println!("Source: {}x{}", bg.width, bg.height);
    println!(
        "Background: {} erased, {} preserved ({})",
        format_count(bg.erased_pixels, "pixel", "pixels"),
        bg.preserved_pixels,
        bg.strategy_label()
    );
    println!("Output: {} {}", report.dimensions(), report.format);
    println!(
        "Size: {} at quality {} (budget {})",
        format_size(report.byte_length as u64),
        report.quality,
        format_size(report.byte_budget as u64)
    );
    if report.attempts.len() > 1 {
        let ladder: Vec<String> = report
            .attempts
            .iter()
            .map(|a| format!("q{}={}", a.quality, format_size(a.byte_length as u64)))
            .collect();
        println!("Attempts: {}", ladder.join(", ").dimmed());
    }
}

/// Print one row of the mode comparison table
pub fn print_mode_row(report: &BackgroundReport) {
    println!(
        "{:<18} {:>10} {:>10} {:>7.1}%  {}",
        report.mode.as_str(),
        report.erased_pixels,
        report.preserved_pixels,
        report.erased_ratio() * 100.0,
        report.strategy_label().dimmed()
    );
}

trait StrategyLabel {
    fn strategy_label(&self) -> String;
}

impl StrategyLabel for BackgroundReport {
    fn strategy_label(&self) -> String {
        let label = format!("{:?}", self.strategy);
        if self.strategy.is_degraded() {
            format!("{}, degraded", label)
        } else {
            label
        }
    }
}

/// Create a progress bar for file processing
pub fn file_progress(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} files ({eta})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓░");
    pb.set_style(style);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Format a file size for display
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Format a count with singular/plural
pub fn format_count(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}
