//! PageRank by power iteration.
//!
//! Treats every undirected edge as a pair of arcs; mass of isolated nodes is
//! spread uniformly. Converged once the L1 change between iterations drops
//! below the tolerance; running out of iterations first is a failure.

use super::{Algorithm, AlgorithmError, AlgorithmFamily, AlgorithmResult, Parameters, Ranking};
use crate::graph::Graph;

const DAMPING: f64 = 0.85;
const DEFAULT_TOLERANCE: f64 = 1e-8;
const DEFAULT_MAX_ITERATIONS: usize = 1000;

#[derive(Debug, Clone)]
pub struct PageRank {
    params: Parameters,
    iterations: usize,
    result: Option<Ranking>,
}

impl PageRank {
    pub fn new(params: Parameters) -> Self {
        PageRank { params, iterations: 0, result: None }
    }

    pub fn number_of_iterations(&self) -> usize {
        self.iterations
    }
}

impl Algorithm for PageRank {
    fn name(&self) -> &str {
        "PageRank"
    }

    fn family(&self) -> AlgorithmFamily {
        AlgorithmFamily::Centrality
    }

    fn run(&mut self, graph: &Graph) -> Result<(), AlgorithmError> {
        let tolerance = self.params.checked_tolerance(DEFAULT_TOLERANCE)?;
        let max_iterations = self.params.checked_max_iterations(DEFAULT_MAX_ITERATIONS)?;
        let n = graph.node_count();
        if n == 0 {
            return Err(AlgorithmError::EmptyGraph);
        }

        let degree: Vec<f64> = (0..n).map(|u| graph.weighted_degree(u)).collect();
        let nf = n as f64;
        let mut rank = vec![1.0 / nf; n];
        let mut next = vec![0.0; n];

        for iteration in 1..=max_iterations {
            let dangling: f64 = (0..n).filter(|&u| degree[u] == 0.0).map(|u| rank[u]).sum();
            let base = (1.0 - DAMPING) / nf + DAMPING * dangling / nf;
            next.iter_mut().for_each(|x| *x = base);
            for u in 0..n {
                for (v, w) in graph.neighbors(u) {
                    // self-loops contribute on both arc ends
                    let share = if u == v { 2.0 * w } else { w };
                    next[v] += DAMPING * rank[u] * share / degree[u];
                }
            }
            let delta: f64 = rank.iter().zip(&next).map(|(a, b)| (a - b).abs()).sum();
            std::mem::swap(&mut rank, &mut next);
            if delta < tolerance {
                self.iterations = iteration;
                self.result = Some(Ranking::new(rank));
                return Ok(());
            }
        }

        self.iterations = max_iterations;
        Err(AlgorithmError::NotConverged { iterations: max_iterations })
    }

    fn take_result(&mut self) -> Option<AlgorithmResult> {
        self.result.take().map(AlgorithmResult::Ranking)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranking(g: &Graph) -> Ranking {
        let mut pr = PageRank::new(Parameters::default());
        pr.run(g).unwrap();
        match pr.take_result() {
            Some(AlgorithmResult::Ranking(r)) => r,
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn star_center_ranks_first() {
        let g = Graph::from_pairs(5, &[(0, 1), (0, 2), (0, 3), (0, 4)]);
        let r = ranking(&g);
        assert_eq!(r.top(1)[0].0, 0);
        let sum: f64 = r.scores().iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn symmetric_graph_has_uniform_scores() {
        let g = Graph::from_pairs(3, &[(0, 1), (1, 2), (2, 0)]);
        let r = ranking(&g);
        for s in r.scores() {
            assert!((s - 1.0 / 3.0).abs() < 1e-9);
        }
    }

    #[test]
    fn too_few_iterations_is_not_converged() {
        let g = Graph::from_pairs(5, &[(0, 1), (0, 2), (0, 3), (0, 4)]);
        let mut pr = PageRank::new(Parameters { max_iterations: Some(1), tolerance: Some(1e-12) });
        assert_eq!(pr.run(&g), Err(AlgorithmError::NotConverged { iterations: 1 }));
        assert!(pr.take_result().is_none());
    }
}
