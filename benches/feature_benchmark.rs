//! Benchmarks for block feature extraction.
//!
//! Run with: cargo bench
//!
//! These benchmarks extract features from a synthetic page with dense text,
//! a ruled table and a few images.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use pdfblocks::features::{FeatureExtractor, FeatureSchema, PageContext};
use pdfblocks::model::{BookmarkNode, Glyph, Page, Path, PathCommand, Point, RasterImage, Rect};

/// Creates a page with `lines` lines of 80 glyphs, a 10x10 table grid and 4 images.
fn create_test_page(lines: usize) -> Page {
    let mut page = Page::new(1, 612.0, 792.0);

    let text = "The quick brown fox jumps over the lazy dog 0123456789 - ";
    for line in 0..lines {
        let y = 760.0 - line as f64 * 12.0;
        for (i, c) in text.chars().cycle().take(80).enumerate() {
            let x = 36.0 + i as f64 * 6.5;
            page.letters
                .push(Glyph::new(c.to_string(), Rect::new(x, y, x + 6.0, y + 10.0)));
        }
    }

    for i in 0..=10 {
        let offset = 36.0 + i as f64 * 20.0;
        page.paths.push(Path::new(vec![PathCommand::line(
            Point::new(36.0, offset),
            Point::new(236.0, offset),
        )]));
        page.paths.push(Path::new(vec![PathCommand::line(
            Point::new(offset, 36.0),
            Point::new(offset, 236.0),
        )]));
    }

    for i in 0..4 {
        let x = 300.0 + i as f64 * 60.0;
        page.images
            .push(RasterImage::new(Rect::new(x, 50.0, x + 50.0, 150.0)));
    }

    page
}

fn bench_region_features(c: &mut Criterion) {
    let mut group = c.benchmark_group("region_features");
    let bookmarks = [
        BookmarkNode::new("Introduction", Some(1), 0),
        BookmarkNode::new("Related Work", Some(1), 0),
    ];

    for lines in [10, 50] {
        let page = create_test_page(lines);
        let ctx = PageContext::new(&page, bookmarks.iter().collect());
        let full = page.bounds();

        for schema in [FeatureSchema::V1, FeatureSchema::V2] {
            let extractor = FeatureExtractor::new(schema);
            group.bench_with_input(
                BenchmarkId::new(schema.name(), lines),
                &full,
                |b, bound| b.iter(|| extractor.extract_region(&ctx, black_box(bound))),
            );
        }
    }

    group.finish();
}

fn bench_table_region(c: &mut Criterion) {
    let page = create_test_page(10);
    let ctx = PageContext::new(&page, Vec::new());
    let extractor = FeatureExtractor::new(FeatureSchema::V1);
    let bound = Rect::new(30.0, 30.0, 240.0, 240.0);

    c.bench_function("table_region_v1", |b| {
        b.iter(|| extractor.extract_region(&ctx, black_box(&bound)))
    });
}

criterion_group!(benches, bench_region_features, bench_table_region);
criterion_main!(benches);
