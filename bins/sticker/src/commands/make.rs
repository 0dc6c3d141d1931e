//! `sticker make`

use super::{default_output, file_stem, read_input, record_sticker};
use crate::output::{self, Status};
use anyhow::Context;
use std::path::Path;
use std::process::ExitCode;
use stickerkit_image::{detect_format, StickerOptions, StickerPipeline};
use stickerkit_telemetry::{metrics, names, Timer};

pub fn run(
    input: &Path,
    output: Option<&Path>,
    content_type: Option<&str>,
    options: StickerOptions,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let data = read_input(input)?;
    let content_type = content_type
        .map(str::to_string)
        .or_else(|| detect_format(&data).map(|f| f.mime_type().to_string()));
    tracing::debug!(path = %input.display(), content_type = ?content_type, "Read input");

    let pipeline = StickerPipeline::new(options)?;
    let timer = Timer::start(names::PIPELINE_MS);
    let sticker = pipeline
        .process_upload(content_type.as_deref(), &data)
        .inspect_err(|_| metrics().increment(names::FAILURES))
        .with_context(|| format!("Could not make a sticker from {}", input.display()))?;
    timer.stop();
    record_sticker(&sticker.report);

    let path = match output {
        Some(path) => path.to_path_buf(),
        None => default_output(input, None, &sticker.report.file_name(&file_stem(input))),
    };
    std::fs::write(&path, sticker.bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;

    if json {
        let value = serde_json::json!({
            "input": input.to_string_lossy(),
            "output": path.to_string_lossy(),
            "report": sticker.report,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        Status::success(&format!("Wrote {}", path.display()));
        output::print_sticker(&sticker.report);
    }

    if !sticker.report.budget_met {
        Status::warning(&format!(
            "Sticker is {} bytes, over the {} byte budget",
            sticker.report.byte_length, sticker.report.byte_budget
        ));
    }

    Ok(ExitCode::SUCCESS)
}
