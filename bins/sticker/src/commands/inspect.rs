//! `sticker inspect`

use super::read_input;
use crate::output::{self, Status};
use std::path::Path;
use std::process::ExitCode;
use stickerkit_image::{inspect_upload, sniff_upload};

pub fn run(input: &Path, json: bool) -> anyhow::Result<ExitCode> {
    let data = read_input(input)?;
    let inspection = inspect_upload(&data);
    // Without a declared content type only PNG and JPEG pass the sniff.
    let verdict = sniff_upload(None, &data);

    if json {
        let value = serde_json::json!({
            "path": input.to_string_lossy(),
            "inspection": inspection,
            "accepted": verdict.is_ok(),
            "reason": verdict.as_ref().err().map(ToString::to_string),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!("Size: {}", output::format_size(inspection.size as u64));
    println!("First bytes: {}", inspection.first_bytes.join(" "));
    println!("PNG: {}", inspection.is_png);
    println!("JPEG: {}", inspection.is_jpeg);
    match inspection.format {
        Some(format) => println!("Format: {:?} ({})", format, format.mime_type()),
        None => println!("Format: unknown"),
    }

    match verdict {
        Ok(()) => Status::success("Accepted as an upload"),
        Err(e) => Status::warning(&e.to_string()),
    }

    Ok(ExitCode::SUCCESS)
}
