//! `sticker analyze`

use super::read_input;
use crate::output::{self, Status};
use owo_colors::OwoColorize;
use std::path::Path;
use std::process::ExitCode;
use stickerkit_image::{compare_modes, composite, label, StickerOptions};

pub fn run(input: &Path, options: StickerOptions, json: bool) -> anyhow::Result<ExitCode> {
    options.validate()?;
    let data = read_input(input)?;
    let image = composite::decode(&data)?;
    let reports = compare_modes(&image, &options)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(ExitCode::SUCCESS);
    }

    Status::header(&format!(
        "{} ({}x{}, threshold {})",
        input.display(),
        image.width(),
        image.height(),
        options.white_threshold
    ));
    println!(
        "{}",
        format!(
            "{:<18} {:>10} {:>10} {:>8}  {}",
            "mode", "erased", "preserved", "share", "strategy"
        )
        .dimmed()
    );
    for report in &reports {
        output::print_mode_row(report);
    }

    if !label::is_available() {
        Status::warning("Built without labeling; border-connected uses margin growth");
    }
    if let Some(first) = reports.first() {
        println!();
        Status::info(&format!(
            "{} near-white",
            output::format_count(first.near_white_pixels, "pixel is", "pixels are")
        ));
    }

    Ok(ExitCode::SUCCESS)
}
