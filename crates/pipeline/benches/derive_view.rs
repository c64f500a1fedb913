//! Benchmarks for deriving a list view
//!
//! Run with: cargo bench --package pipeline
//!
//! Builds a large accumulated list by repeating the fixture items, then
//! measures a full filter + sort recompute per sort mode.

use catalog::{Catalog, Item};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pipeline::{derive_view, FilterCriteria, SortMode};
use std::path::Path;

fn accumulated_items(copies: u64) -> Vec<Item> {
    let catalog =
        Catalog::load_from_dir(Path::new("../../data")).expect("Failed to load fixture catalog");
    let base = catalog.items();
    let stride = base.len() as u64;

    (0..copies)
        .flat_map(|copy| {
            base.iter().map(move |item| {
                let mut item = item.clone();
                item.id += copy * stride;
                item
            })
        })
        .collect()
}

fn bench_derive_view(c: &mut Criterion) {
    let items = accumulated_items(500);
    let criteria = FilterCriteria::new().with("size", ["S", "M"]);

    let mut group = c.benchmark_group("derive_view");
    for mode in [SortMode::Recommended, SortMode::LowestPrice, SortMode::HighestDiscountRate] {
        group.bench_with_input(BenchmarkId::from_parameter(mode), &mode, |b, &mode| {
            b.iter(|| black_box(derive_view(black_box(&items), &criteria, mode)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_derive_view);
criterion_main!(benches);
