//! Normalization benchmarks for sitetext
//!
//! Measures whitespace collapsing and word-budget truncation over inputs in
//! the size range real pages produce.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sitetext::normalize::Normalizer;

fn normalize_benchmark(c: &mut Criterion) {
    let normalizer = Normalizer::default();

    let short = "A  short\tfragment\nwith   mixed whitespace";
    let long = vec!["lorem ipsum  dolor\tsit\namet"; 2000].join("  \n");

    c.bench_function("normalize_short", |b| {
        b.iter(|| normalizer.normalize(black_box(short)))
    });

    c.bench_function("normalize_over_budget", |b| {
        b.iter(|| normalizer.normalize(black_box(&long)))
    });
}

criterion_group!(benches, normalize_benchmark);
criterion_main!(benches);
