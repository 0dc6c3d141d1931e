//! End-to-end sticker scenarios.

#![cfg(feature = "labeling")]

use image::{DynamicImage, ImageOutputFormat, Rgba, RgbaImage};
use std::io::Cursor;
use stickerkit_image::{
    classify, label, remove_background, Connectivity, MaskStrategy, RemovalMode, StickerError,
    StickerOptions, StickerPipeline,
};

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

fn png_bytes(img: &RgbaImage) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img.clone())
        .write_to(&mut buf, ImageOutputFormat::Png)
        .unwrap();
    buf.into_inner()
}

#[test]
fn solid_white_becomes_fully_transparent_sticker() {
    let img = RgbaImage::from_pixel(100, 100, WHITE);

    let near_white = classify(&img, 240);
    assert_eq!(near_white.count(), 100 * 100);
    let grid = label(&near_white, Connectivity::Eight).unwrap();
    assert_eq!(grid.border_regions().labels().collect::<Vec<_>>(), vec![1]);

    let pipeline = StickerPipeline::new(StickerOptions::default()).unwrap();
    let sticker = pipeline.process_bytes(&png_bytes(&img)).unwrap();
    let report = &sticker.report;

    assert_eq!(report.background.erased_pixels, 100 * 100);
    assert_eq!(report.background.strategy, MaskStrategy::Labeled);
    assert_eq!(report.dimensions(), "512x512");
    assert_eq!(report.quality, 90);
    assert!(report.byte_length < 102_400);
    assert!(report.budget_met);
    assert_eq!(report.attempts.len(), 1);
    assert_eq!(report.mime_type, "image/webp");

    let decoded = webp::Decoder::new(sticker.bytes()).decode().unwrap();
    assert_eq!((decoded.width(), decoded.height()), (512, 512));
    assert!(decoded.is_alpha());
    assert!(decoded.chunks_exact(4).all(|px| px[3] == 0));
}

#[test]
fn white_ring_is_erased_black_core_stays_opaque() {
    let mut img = RgbaImage::from_pixel(10, 10, WHITE);
    for y in 1..9 {
        for x in 1..9 {
            img.put_pixel(x, y, BLACK);
        }
    }

    let (out, report) = remove_background(img, &StickerOptions::default()).unwrap();
    assert_eq!(report.erased_pixels, 36);
    assert_eq!(report.preserved_pixels, 0);
    for (x, y, px) in out.enumerate_pixels() {
        let ring = x == 0 || y == 0 || x == 9 || y == 9;
        assert_eq!(px[3], if ring { 0 } else { 255 }, "pixel ({}, {})", x, y);
    }
}

#[test]
fn only_border_blob_is_erased() {
    let mut img = RgbaImage::from_pixel(20, 12, BLACK);
    // touches the left edge: 3x4 = 12 pixels
    for y in 2..6 {
        for x in 0..3 {
            img.put_pixel(x, y, WHITE);
        }
    }
    // enclosed: 4x3 = 12 pixels, plus one more below = 13
    for y in 4..7 {
        for x in 10..14 {
            img.put_pixel(x, y, WHITE);
        }
    }
    img.put_pixel(11, 7, WHITE);

    let (out, report) = remove_background(img, &StickerOptions::default()).unwrap();
    assert_eq!(report.near_white_pixels, 25);
    assert_eq!(report.erased_pixels, 12);
    assert_eq!(report.preserved_pixels, 13);
    assert_eq!(out.get_pixel(1, 3)[3], 0);
    assert_eq!(out.get_pixel(11, 7)[3], 255);

    let regions = report.regions.unwrap();
    assert_eq!(regions.region_count, 2);
    assert_eq!(regions.border_regions, 1);
}

#[test]
fn enclosed_white_survives_but_naive_mode_erases_it() {
    let mut img = RgbaImage::from_pixel(9, 9, BLACK);
    for y in 3..6 {
        for x in 3..6 {
            img.put_pixel(x, y, WHITE);
        }
    }

    let (_, border) = remove_background(img.clone(), &StickerOptions::default()).unwrap();
    assert_eq!(border.erased_pixels, 0);
    assert_eq!(border.preserved_pixels, 9);

    let naive = StickerOptions::default().with_mode(RemovalMode::NaiveThreshold);
    let (_, naive) = remove_background(img, &naive).unwrap();
    assert_eq!(naive.erased_pixels, 9);
}

#[test]
fn photo_without_white_is_encoded_unchanged_before_resize() {
    let img = RgbaImage::from_fn(40, 30, |x, y| Rgba([(x * 6) as u8, (y * 8) as u8, 100, 255]));
    let (out, report) = remove_background(img.clone(), &StickerOptions::default()).unwrap();
    assert_eq!(out, img);
    assert_eq!(report.strategy, MaskStrategy::NothingToErase);
}

#[test]
fn single_quality_reports_unmet_budget_without_failing() {
    let noisy = RgbaImage::from_fn(64, 64, |x, y| {
        let v = (x.wrapping_mul(2_654_435_761) ^ y.wrapping_mul(40_503)) as u8;
        Rgba([v, v.rotate_left(3), v.rotate_left(5), 255])
    });
    let opts = StickerOptions {
        byte_budget: 16,
        ..StickerOptions::single_quality(90)
    };

    let sticker = StickerPipeline::new(opts).unwrap().process_image(noisy).unwrap();
    assert!(!sticker.report.budget_met);
    assert_eq!(sticker.report.quality, 90);
    assert!(sticker.report.byte_length >= 16);
}

#[test]
fn garbage_upload_is_rejected() {
    let pipeline = StickerPipeline::new(StickerOptions::default()).unwrap();

    let err = pipeline.process_upload(Some("text/plain"), b"hello, world").unwrap_err();
    assert!(matches!(err, StickerError::InvalidUpload(_)));

    let err = pipeline.process_upload(Some("image/png"), b"hello, world").unwrap_err();
    assert!(matches!(err, StickerError::Decode(_)));
}
