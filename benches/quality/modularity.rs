//! Modularity evaluation cost on ring-of-cliques graphs.
//!
//! Run: `cargo bench --bench modularity`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use graph_harness::algorithm::Partition;
use graph_harness::graph::Graph;
use graph_harness::quality::modularity;

const CLIQUE: u32 = 8;

/// `cliques` cliques of `CLIQUE` nodes, consecutive cliques joined by one edge.
fn ring_of_cliques(cliques: u32) -> (Graph, Partition) {
    let mut edges = Vec::new();
    for c in 0..cliques {
        let base = c * CLIQUE;
        for i in 0..CLIQUE {
            for j in (i + 1)..CLIQUE {
                edges.push((base + i, base + j));
            }
        }
        edges.push((base, ((c + 1) % cliques) * CLIQUE + 1));
    }
    let n = (cliques * CLIQUE) as usize;
    let partition = Partition::from_vec((0..n as u64).map(|u| u / CLIQUE as u64).collect());
    (Graph::from_pairs(n, &edges), partition)
}

fn modularity_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("modularity");
    for cliques in [16u32, 256, 4096] {
        let (graph, partition) = ring_of_cliques(cliques);
        group.bench_with_input(BenchmarkId::from_parameter(graph.edge_count()), &cliques, |b, _| {
            b.iter(|| modularity(black_box(&graph), black_box(&partition)).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, modularity_benchmark);
criterion_main!(benches);
