//! Label propagation community detection.
//!
//! Every node starts in its own community and repeatedly adopts the label
//! carrying the heaviest edge weight among its neighbours. Iteration stops
//! once no more than `theta = n / 100000` nodes changed label in a sweep, or
//! when the iteration limit is hit. Each sweep is recorded as one `iterate`
//! phase.

use std::collections::HashMap;

use tracing::debug;

use super::{Algorithm, AlgorithmError, AlgorithmFamily, AlgorithmResult, Parameters, Partition};
use crate::graph::Graph;
use crate::timing::PhaseTiming;

const COUNTED: &[&str] = &["iterate"];

#[derive(Debug, Clone)]
pub struct Plp {
    params: Parameters,
    timing: PhaseTiming,
    iterations: usize,
    result: Option<Partition>,
}

impl Plp {
    pub fn new(params: Parameters) -> Self {
        Plp {
            params,
            timing: PhaseTiming::new(),
            iterations: 0,
            result: None,
        }
    }

    /// Sweeps performed by the last run.
    pub fn number_of_iterations(&self) -> usize {
        self.iterations
    }
}

impl Algorithm for Plp {
    fn name(&self) -> &str {
        "PLP"
    }

    fn family(&self) -> AlgorithmFamily {
        AlgorithmFamily::CommunityDetection
    }

    fn run(&mut self, graph: &Graph) -> Result<(), AlgorithmError> {
        if self.params.tolerance.is_some() {
            return Err(AlgorithmError::InvalidParameter {
                name: "tolerance",
                message: "PLP stops on an update threshold, not a tolerance".to_string(),
            });
        }
        let max_iterations = self.params.checked_max_iterations(usize::MAX)?;
        let n = graph.node_count();
        if n == 0 {
            return Err(AlgorithmError::EmptyGraph);
        }

        let theta = n / 100_000;
        let mut labels: Vec<u64> = (0..n as u64).collect();
        let mut timing = PhaseTiming::new();
        let mut iterations = 0;
        let mut updated = n;
        let mut weights: HashMap<u64, f64> = HashMap::new();

        while updated > theta && iterations < max_iterations {
            iterations += 1;
            updated = timing.measure("iterate", || {
                let mut changed = 0;
                for u in 0..n {
                    weights.clear();
                    for (v, w) in graph.neighbors(u) {
                        if v != u {
                            *weights.entry(labels[v]).or_insert(0.0) += w;
                        }
                    }
                    if weights.is_empty() {
                        continue;
                    }
                    let current = labels[u];
                    let own = weights.get(&current).copied().unwrap_or(f64::NEG_INFINITY);
                    let (best, best_w) = weights
                        .iter()
                        .map(|(&l, &w)| (l, w))
                        .fold((current, own), |acc, cand| {
                            if cand.1 > acc.1 || (cand.1 == acc.1 && acc.0 != current && cand.0 < acc.0) {
                                cand
                            } else {
                                acc
                            }
                        });
                    if best != current && best_w > own {
                        labels[u] = best;
                        changed += 1;
                    }
                }
                changed
            });
            debug!(iteration = iterations, updated, "label propagation sweep");
        }

        self.iterations = iterations;
        self.timing = timing;
        self.result = Some(Partition::from_vec(labels));
        Ok(())
    }

    fn take_result(&mut self) -> Option<AlgorithmResult> {
        self.result.take().map(AlgorithmResult::Partition)
    }

    fn phase_timing(&self) -> Option<&PhaseTiming> {
        Some(&self.timing)
    }

    fn counted_phases(&self) -> &[&'static str] {
        COUNTED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_triangles() -> Graph {
        Graph::from_pairs(6, &[(0, 1), (1, 2), (0, 2), (3, 4), (4, 5), (3, 5), (2, 3)])
    }

    fn run(graph: &Graph, params: Parameters) -> (Plp, Partition) {
        let mut plp = Plp::new(params);
        plp.run(graph).unwrap();
        let p = match plp.take_result() {
            Some(AlgorithmResult::Partition(p)) => p,
            other => panic!("unexpected result {:?}", other),
        };
        (plp, p)
    }

    #[test]
    fn separates_disconnected_edges() {
        let g = Graph::from_pairs(4, &[(0, 1), (2, 3)]);
        let (_, p) = run(&g, Parameters::default());
        assert_eq!(p.get(0), p.get(1));
        assert_eq!(p.get(2), p.get(3));
        assert_ne!(p.get(0), p.get(2));
    }

    #[test]
    fn records_one_phase_entry_per_iteration() {
        let (plp, p) = run(&two_triangles(), Parameters::default());
        assert_eq!(p.missing(6), 0);
        let timing = plp.phase_timing().unwrap();
        assert_eq!(timing.get("iterate").unwrap().len(), plp.number_of_iterations());
        assert!(plp.number_of_iterations() >= 1);
    }

    #[test]
    fn respects_iteration_limit() {
        let params = Parameters { max_iterations: Some(1), tolerance: None };
        let (plp, _) = run(&two_triangles(), params);
        assert_eq!(plp.number_of_iterations(), 1);
    }

    #[test]
    fn isolated_nodes_keep_own_label() {
        let g = Graph::from_pairs(3, &[(0, 1)]);
        let (_, p) = run(&g, Parameters::default());
        assert_eq!(p.get(2), Some(2));
        assert_eq!(p.number_of_subsets(), 2);
    }

    #[test]
    fn rejects_tolerance_and_empty_graph() {
        let mut plp = Plp::new(Parameters { max_iterations: None, tolerance: Some(0.1) });
        assert!(matches!(
            plp.run(&two_triangles()),
            Err(AlgorithmError::InvalidParameter { name: "tolerance", .. })
        ));
        let mut plp = Plp::new(Parameters::default());
        assert_eq!(plp.run(&Graph::from_pairs(0, &[])), Err(AlgorithmError::EmptyGraph));
    }
}
