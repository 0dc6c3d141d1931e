//! Command line behavior of the `sticker` binary.

use assert_cmd::Command;
use image::{Rgba, RgbaImage};
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn sticker(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("sticker").unwrap();
    cmd.current_dir(dir).env_remove("RUST_LOG");
    cmd
}

/// Black square on a white page.
fn write_logo(path: &Path) {
    let img = RgbaImage::from_fn(40, 40, |x, y| {
        if (10..30).contains(&x) && (10..30).contains(&y) {
            Rgba([0, 0, 0, 255])
        } else {
            Rgba([255, 255, 255, 255])
        }
    });
    img.save(path).unwrap();
}

#[test]
fn make_writes_webp_next_to_input() {
    let dir = TempDir::new().unwrap();
    write_logo(&dir.path().join("logo.png"));

    sticker(dir.path())
        .args(["make", "logo.png"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sticker-logo.webp"))
        .stdout(predicate::str::contains("512x512"));

    let bytes = std::fs::read(dir.path().join("sticker-logo.webp")).unwrap();
    assert_eq!(&bytes[..4], b"RIFF");
    assert_eq!(&bytes[8..12], b"WEBP");
}

#[test]
fn make_json_report() {
    let dir = TempDir::new().unwrap();
    write_logo(&dir.path().join("logo.png"));

    let out = sticker(dir.path())
        .args(["make", "logo.png", "-o", "out.webp", "--json", "-q", "70"])
        .output()
        .unwrap();
    assert!(out.status.success());

    let value: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let report = &value["report"];
    assert_eq!(report["output_width"], 512);
    assert_eq!(report["quality"], 70);
    assert_eq!(report["mime_type"], "image/webp");
    assert_eq!(report["background"]["erased_pixels"], 40 * 40 - 20 * 20);
    assert!(dir.path().join("out.webp").exists());
}

#[test]
fn make_rejects_non_image() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("notes.txt"), "definitely not an image").unwrap();

    sticker(dir.path())
        .args(["make", "notes.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File must be an image"));
}

#[test]
fn config_file_sets_defaults() {
    let dir = TempDir::new().unwrap();
    write_logo(&dir.path().join("logo.png"));
    std::fs::write(
        dir.path().join(".stickerkit.toml"),
        "[sticker]\noutput_size = 128\nquality_candidates = [55]\n",
    )
    .unwrap();

    let out = sticker(dir.path())
        .args(["make", "logo.png", "--json"])
        .output()
        .unwrap();
    assert!(out.status.success());

    let value: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(value["report"]["output_width"], 128);
    assert_eq!(value["report"]["quality"], 55);
}

#[test]
fn invalid_config_fails() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("bad.toml"), "[sticker]\noutput_size = 0\n").unwrap();

    sticker(dir.path())
        .args(["--config", "bad.toml", "inspect", "bad.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("output_size"));
}

#[test]
fn inspect_reports_png_signature() {
    let dir = TempDir::new().unwrap();
    write_logo(&dir.path().join("logo.png"));

    sticker(dir.path())
        .args(["inspect", "logo.png"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PNG: true"))
        .stdout(predicate::str::contains("0x89"));
}

#[test]
fn analyze_compares_all_modes() {
    let dir = TempDir::new().unwrap();
    write_logo(&dir.path().join("logo.png"));

    let out = sticker(dir.path())
        .args(["analyze", "logo.png", "--json"])
        .output()
        .unwrap();
    assert!(out.status.success());

    let reports: Vec<serde_json::Value> = serde_json::from_slice(&out.stdout).unwrap();
    let modes: Vec<&str> = reports.iter().filter_map(|r| r["mode"].as_str()).collect();
    assert_eq!(modes, ["border-connected", "naive-threshold", "morphological"]);
}

#[test]
fn batch_processes_images_and_skips_other_files() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in");
    std::fs::create_dir(&input).unwrap();
    write_logo(&input.join("a.png"));
    write_logo(&input.join("b.png"));
    std::fs::write(input.join("readme.txt"), "not an image").unwrap();

    sticker(dir.path())
        .args(["batch", "in", "-o", "out"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 stickers"));

    assert!(dir.path().join("out/sticker-a.webp").exists());
    assert!(dir.path().join("out/sticker-b.webp").exists());
    assert!(!dir.path().join("out/sticker-readme.webp").exists());
}

#[test]
fn batch_mirrors_nested_dirs_under_output() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in");
    std::fs::create_dir_all(input.join("a")).unwrap();
    std::fs::create_dir_all(input.join("b")).unwrap();
    write_logo(&input.join("a/x.png"));
    write_logo(&input.join("b/x.png"));

    sticker(dir.path())
        .args(["batch", "in", "-o", "out"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 stickers"));

    assert!(dir.path().join("out/a/sticker-x.webp").exists());
    assert!(dir.path().join("out/b/sticker-x.webp").exists());
}

#[test]
fn batch_fails_same_stem_instead_of_overwriting() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in");
    std::fs::create_dir(&input).unwrap();
    write_logo(&input.join("logo.png"));
    let jpeg = image::DynamicImage::ImageRgba8(RgbaImage::from_pixel(
        40,
        40,
        Rgba([0, 0, 0, 255]),
    ))
    .to_rgb8();
    jpeg.save(input.join("logo.jpg")).unwrap();
    write_logo(&input.join("cat.png"));

    sticker(dir.path())
        .args(["batch", "in"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("would also be written from"))
        .stdout(predicate::str::contains("1 sticker from 3 images"));

    assert!(!input.join("sticker-logo.webp").exists());
    assert!(input.join("sticker-cat.webp").exists());
}

#[test]
fn logging_format_json_from_config() {
    let dir = TempDir::new().unwrap();
    write_logo(&dir.path().join("logo.png"));
    std::fs::write(
        dir.path().join(".stickerkit.toml"),
        "[logging]\nlevel = \"info\"\nformat = \"json\"\n",
    )
    .unwrap();

    let out = sticker(dir.path()).args(["make", "logo.png"]).output().unwrap();
    assert!(out.status.success());

    let stderr = String::from_utf8_lossy(&out.stderr);
    let line = stderr
        .lines()
        .find(|l| l.contains("Processing image"))
        .expect("pipeline log line");
    let event: serde_json::Value = serde_json::from_str(line).unwrap();
    assert_eq!(event["level"], "INFO");
}
