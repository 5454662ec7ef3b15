//! Partition quality.
//!
//! ```text
//! Q = Σ_c [ intra(c) / m  -  (vol(c) / 2m)² ]
//! ```
//!
//! `m` is the total edge weight, `intra(c)` the weight of edges inside `c`
//! (self-loops once) and `vol(c)` the weighted degree sum of `c` (self-loops
//! twice). Communities are accumulated in id order so repeated calls are
//! bit-identical.

use std::collections::BTreeMap;

use crate::algorithm::Partition;
use crate::error::{HarnessError, Result};
use crate::graph::Graph;

/// Modularity of `partition` over `graph`.
///
/// Every node of the graph must be assigned; an edgeless graph scores `0.0`.
pub fn modularity(graph: &Graph, partition: &Partition) -> Result<f64> {
    let n = graph.node_count();
    let missing = partition.missing(n);
    if missing > 0 {
        return Err(HarnessError::PartitionCoverage { missing, node_count: n });
    }

    let m = graph.total_edge_weight();
    if m == 0.0 {
        return Ok(0.0);
    }

    // (intra, volume) per community
    let mut per: BTreeMap<u64, (f64, f64)> = BTreeMap::new();
    for u in 0..n {
        let c = community(partition, u);
        per.entry(c).or_insert((0.0, 0.0)).1 += graph.weighted_degree(u);
    }
    for (u, v, w) in graph.edges() {
        let cu = community(partition, u);
        if cu == community(partition, v) {
            per.entry(cu).or_insert((0.0, 0.0)).0 += w;
        }
    }

    let q = per.values().fold(0.0, |acc, &(intra, vol)| {
        let share = vol / (2.0 * m);
        acc + intra / m - share * share
    });
    Ok(q)
}

fn community(partition: &Partition, node: usize) -> u64 {
    // coverage is checked before any lookup
    partition.get(node).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path4() -> Graph {
        Graph::from_pairs(4, &[(0, 1), (1, 2), (2, 3)])
    }

    #[test]
    fn path_split_in_halves() {
        let p = Partition::from_vec(vec![0, 0, 1, 1]);
        let q = modularity(&path4(), &p).unwrap();
        // 2 * (1/3 - (3/6)^2)
        assert!((q - (2.0 / 3.0 - 0.5)).abs() < 1e-12);
    }

    #[test]
    fn single_community_scores_zero() {
        let p = Partition::from_vec(vec![5, 5, 5, 5]);
        assert!(modularity(&path4(), &p).unwrap().abs() < 1e-12);
    }

    #[test]
    fn singletons_score_negative() {
        let p = Partition::from_vec(vec![0, 1, 2, 3]);
        assert!(modularity(&path4(), &p).unwrap() < 0.0);
    }

    #[test]
    fn non_contiguous_ids_are_fine() {
        let a = modularity(&path4(), &Partition::from_vec(vec![0, 0, 1, 1])).unwrap();
        let b = modularity(&path4(), &Partition::from_vec(vec![90, 90, 7, 7])).unwrap();
        assert!((a - b).abs() < 1e-15);
    }

    #[test]
    fn deterministic_bit_for_bit() {
        let g = Graph::from_edges(
            5,
            &[(0, 1, 0.3), (1, 2, 1.7), (2, 3, 0.1), (3, 4, 2.9), (4, 0, 0.7), (2, 2, 0.4)],
            true,
        );
        let p = Partition::from_vec(vec![3, 3, 1, 8, 8]);
        let first = modularity(&g, &p).unwrap();
        for _ in 0..10 {
            assert_eq!(modularity(&g, &p).unwrap().to_bits(), first.to_bits());
        }
    }

    #[test]
    fn partial_partition_is_coverage_error() {
        let p = Partition::from_pairs(4, [(0, 0), (1, 0), (3, 1)]);
        let err = modularity(&path4(), &p).unwrap_err();
        assert!(matches!(err, HarnessError::PartitionCoverage { missing: 1, node_count: 4 }));

        let short = Partition::from_vec(vec![0, 0]);
        assert!(modularity(&path4(), &short).is_err());
    }

    #[test]
    fn edgeless_graph_scores_zero() {
        let g = Graph::from_pairs(2, &[]);
        assert_eq!(modularity(&g, &Partition::from_vec(vec![0, 1])).unwrap(), 0.0);
    }
}
