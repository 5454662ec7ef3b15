//! Top-k extraction across the batch ladder.
//!
//! Run: `cargo bench --bench top_k`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use graph_harness::algorithm::ScoredPair;
use graph_harness::sweep::{top_k, BATCH_LADDER};

const PAIRS: usize = 1_000_000;

/// Deterministic pseudo-random scores (64-bit LCG).
fn scored_pairs(count: usize) -> Vec<ScoredPair> {
    let mut state = 0x2545_f491_4f6c_dd1du64;
    (0..count)
        .map(|i| {
            state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
            ScoredPair { u: i / 1000, v: i % 1000 + 1000, score: (state >> 11) as f64 / (1u64 << 53) as f64 }
        })
        .collect()
}

fn top_k_benchmark(c: &mut Criterion) {
    let pairs = scored_pairs(PAIRS);
    let mut group = c.benchmark_group("top_k");
    group.sample_size(20);
    for fraction in BATCH_LADDER.iter().skip(1) {
        let k = fraction.batch_size(PAIRS as u64) as usize;
        group.bench_with_input(BenchmarkId::from_parameter(fraction), &k, |b, &k| {
            b.iter(|| top_k(black_box(&pairs), k));
        });
    }
    group.finish();
}

criterion_group!(benches, top_k_benchmark);
criterion_main!(benches);
