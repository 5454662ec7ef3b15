//! Jaccard-index link prediction.
//!
//! Scores every non-adjacent pair `(u, v)`, `u < v`, that shares at least one
//! neighbour with `|N(u) ∩ N(v)| / |N(u) ∪ N(v)|`. Pairs without a common
//! neighbour score zero and are left out of the list.

use super::{Algorithm, AlgorithmError, AlgorithmFamily, AlgorithmResult, Parameters, ScoredPair};
use crate::graph::Graph;

#[derive(Debug, Clone)]
pub struct JaccardIndex {
    params: Parameters,
    result: Option<Vec<ScoredPair>>,
}

impl JaccardIndex {
    pub fn new(params: Parameters) -> Self {
        JaccardIndex { params, result: None }
    }
}

/// Sorted, deduplicated neighbour lists without self-loops.
fn neighbour_sets(graph: &Graph) -> Vec<Vec<usize>> {
    (0..graph.node_count())
        .map(|u| {
            let mut nbrs: Vec<usize> = graph.neighbors(u).map(|(v, _)| v).filter(|&v| v != u).collect();
            nbrs.sort_unstable();
            nbrs.dedup();
            nbrs
        })
        .collect()
}

impl Algorithm for JaccardIndex {
    fn name(&self) -> &str {
        "JaccardIndex"
    }

    fn family(&self) -> AlgorithmFamily {
        AlgorithmFamily::LinkPrediction
    }

    fn run(&mut self, graph: &Graph) -> Result<(), AlgorithmError> {
        if !self.params.is_empty() {
            return Err(AlgorithmError::InvalidParameter {
                name: "parameters",
                message: "Jaccard index takes no parameters".to_string(),
            });
        }
        let n = graph.node_count();
        if n == 0 {
            return Err(AlgorithmError::EmptyGraph);
        }

        let nbrs = neighbour_sets(graph);
        let mut common = vec![0usize; n];
        let mut touched: Vec<usize> = Vec::new();
        let mut pairs = Vec::new();

        for u in 0..n {
            for &w in &nbrs[u] {
                for &v in &nbrs[w] {
                    if v <= u {
                        continue;
                    }
                    if common[v] == 0 {
                        touched.push(v);
                    }
                    common[v] += 1;
                }
            }
            touched.sort_unstable();
            for &v in &touched {
                let c = common[v];
                common[v] = 0;
                if nbrs[u].binary_search(&v).is_ok() {
                    continue;
                }
                let union = nbrs[u].len() + nbrs[v].len() - c;
                pairs.push(ScoredPair { u, v, score: c as f64 / union as f64 });
            }
            touched.clear();
        }

        self.result = Some(pairs);
        Ok(())
    }

    fn take_result(&mut self) -> Option<AlgorithmResult> {
        self.result.take().map(AlgorithmResult::ScoredPairs)
    }
}
