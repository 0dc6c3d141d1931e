//! `sticker batch`

use super::{file_stem, record_sticker};
use crate::output::{self, Status};
use anyhow::Context;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use stickerkit_image::{detect_format, ImageFormat, StickerOptions, StickerPipeline};
use stickerkit_telemetry::{metrics, names, Timer};
use walkdir::WalkDir;

/// Bytes needed to recognise every supported signature.
const SNIFF_LEN: u64 = 16;

/// Outcome for one file of the batch.
#[derive(Debug, Serialize)]
struct BatchEntry {
    path: PathBuf,
    output: Option<PathBuf>,
    byte_length: Option<usize>,
    quality: Option<u8>,
    budget_met: Option<bool>,
    error: Option<String>,
}

impl BatchEntry {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            output: None,
            byte_length: None,
            quality: None,
            budget_met: None,
            error: None,
        }
    }

    fn failed(path: &Path, error: String) -> Self {
        Self {
            error: Some(error),
            ..Self::new(path)
        }
    }
}

/// One image of the batch and where its sticker goes.
#[derive(Debug, Clone, PartialEq)]
struct Job {
    path: PathBuf,
    format: ImageFormat,
    target: PathBuf,
}

pub fn run(
    dir: &Path,
    output_dir: Option<&Path>,
    options: StickerOptions,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let pipeline = StickerPipeline::new(options)?;
    if let Some(out) = output_dir {
        std::fs::create_dir_all(out)
            .with_context(|| format!("Failed to create {}", out.display()))?;
    }

    let files: Vec<PathBuf> = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| !is_previous_output(e.path()))
        .map(|e| e.into_path())
        .collect();

    let jobs: Vec<Job> = files
        .par_iter()
        .filter_map(|path| {
            let format = sniff_file(path)?;
            let name = pipeline.file_name(&file_stem(path));
            Some(Job {
                path: path.clone(),
                format,
                target: target_for(dir, path, output_dir, &name),
            })
        })
        .collect();
    let (jobs, mut entries) = split_collisions(jobs);
    for entry in &entries {
        tracing::warn!(path = %entry.path.display(), "Skipping image with a colliding output name");
    }

    let pb = output::file_progress(jobs.len() as u64);
    let processed: Vec<BatchEntry> = jobs
        .par_iter()
        .map(|job| {
            let entry = process_job(&pipeline, job);
            pb.inc(1);
            entry
        })
        .collect();
    pb.finish_and_clear();
    entries.extend(processed);

    let failed = entries.iter().filter(|e| e.error.is_some()).count();
    let over_budget = entries
        .iter()
        .filter(|e| e.budget_met == Some(false))
        .count();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        for entry in entries.iter().filter(|e| e.error.is_some()) {
            Status::error(&format!(
                "{}: {}",
                entry.path.display(),
                entry.error.as_deref().unwrap_or_default()
            ));
        }
        Status::info(&format!(
            "Made {} from {} in {}",
            output::format_count(entries.len() - failed, "sticker", "stickers"),
            output::format_count(entries.len(), "image", "images"),
            dir.display()
        ));
        if over_budget > 0 {
            Status::warning(&format!("{} over the byte budget", over_budget));
        }
    }

    Ok(if failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn is_previous_output(path: &Path) -> bool {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    name.starts_with("sticker-") && name.ends_with(".webp")
}

/// Image format from the first bytes of `path`; `None` for other files.
fn sniff_file(path: &Path) -> Option<ImageFormat> {
    let mut head = Vec::with_capacity(SNIFF_LEN as usize);
    let read = std::fs::File::open(path).and_then(|f| f.take(SNIFF_LEN).read_to_end(&mut head));
    if let Err(e) = read {
        tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable file");
        return None;
    }
    detect_format(&head)
}

/// Sticker path for `path`: mirrors the tree below `dir` under `output_dir`,
/// or sits next to the input.
fn target_for(dir: &Path, path: &Path, output_dir: Option<&Path>, file_name: &str) -> PathBuf {
    let parent = path.parent().unwrap_or(Path::new(""));
    let base = match output_dir {
        Some(out) => out.join(parent.strip_prefix(dir).unwrap_or(Path::new(""))),
        None => parent.to_path_buf(),
    };
    base.join(file_name)
}

/// Keep jobs with a target of their own; jobs sharing a target all fail.
fn split_collisions(jobs: Vec<Job>) -> (Vec<Job>, Vec<BatchEntry>) {
    let mut claims: HashMap<PathBuf, Vec<PathBuf>> = HashMap::new();
    for job in &jobs {
        claims
            .entry(job.target.clone())
            .or_default()
            .push(job.path.clone());
    }

    let mut unique = Vec::with_capacity(jobs.len());
    let mut collisions = Vec::new();
    for job in jobs {
        let sources = &claims[&job.target];
        if sources.len() == 1 {
            unique.push(job);
            continue;
        }
        let others: Vec<String> = sources
            .iter()
            .filter(|p| **p != job.path)
            .map(|p| p.display().to_string())
            .collect();
        collisions.push(BatchEntry::failed(
            &job.path,
            format!(
                "{} would also be written from {}",
                job.target.display(),
                others.join(", ")
            ),
        ));
    }
    (unique, collisions)
}

fn process_job(pipeline: &StickerPipeline, job: &Job) -> BatchEntry {
    let mut entry = BatchEntry::new(&job.path);

    let timer = Timer::start(names::PIPELINE_MS);
    let result = std::fs::read(&job.path)
        .with_context(|| format!("Failed to read {}", job.path.display()))
        .and_then(|data| Ok(pipeline.process_upload(Some(job.format.mime_type()), &data)?))
        .and_then(|sticker| {
            if let Some(parent) = job.target.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            std::fs::write(&job.target, sticker.bytes())
                .with_context(|| format!("Failed to write {}", job.target.display()))?;
            Ok(sticker.report)
        });
    timer.stop();

    match result {
        Ok(report) => {
            record_sticker(&report);
            entry.output = Some(job.target.clone());
            entry.byte_length = Some(report.byte_length);
            entry.quality = Some(report.quality);
            entry.budget_met = Some(report.budget_met);
        }
        Err(e) => {
            metrics().increment(names::FAILURES);
            tracing::warn!(path = %job.path.display(), error = %e, "Sticker failed");
            entry.error = Some(format!("{:#}", e));
        }
    }
    entry
}
