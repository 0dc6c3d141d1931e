//! Benchmarks for background detection.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{Rgba, RgbaImage};
use stickerkit_image::background::{border_connected_mask, margin_growth_mask};
use stickerkit_image::{classify, Connectivity};

/// White canvas with a dark ring and a white core, like a logo on paper.
fn logo_on_paper(size: u32) -> RgbaImage {
    let c = size as f32 / 2.0;
    RgbaImage::from_fn(size, size, |x, y| {
        let d = ((x as f32 - c).powi(2) + (y as f32 - c).powi(2)).sqrt();
        if d > size as f32 * 0.3 && d < size as f32 * 0.4 {
            Rgba([20, 40, 160, 255])
        } else {
            Rgba([252, 252, 252, 255])
        }
    })
}

fn bench_classify(c: &mut Criterion) {
    let img = logo_on_paper(1024);
    c.bench_function("classify_1024", |b| b.iter(|| classify(black_box(&img), 240)));
}

fn bench_erase_masks(c: &mut Criterion) {
    let near_white = classify(&logo_on_paper(1024), 240);

    c.bench_function("labeled_1024", |b| {
        b.iter(|| border_connected_mask(black_box(&near_white), Connectivity::Eight))
    });

    c.bench_function("margin_growth_1024", |b| {
        b.iter(|| margin_growth_mask(black_box(&near_white), 5))
    });
}

criterion_group!(benches, bench_classify, bench_erase_masks);
criterion_main!(benches);
