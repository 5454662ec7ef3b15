//! Batch-sweep driver for link prediction.
//!
//! For each fraction `10^e` of the ladder the batch size is
//! `floor(10^e * edge_count)`; fractions yielding a batch below one are
//! skipped without running anything. Each retained batch runs the scorer over
//! the whole graph, then extracts the top-`batch` pairs. The extraction time
//! is the metric reported for that batch size.

use std::cmp::Ordering;
use std::fmt;
use std::time::Duration;

use tracing::debug;

use crate::algorithm::{Algorithm, AlgorithmResult, ScoredPair};
use crate::error::{HarnessError, Result};
use crate::graph::Graph;
use crate::runner;
use crate::timing::timed;

/// A batch fraction `10^exponent` with `exponent < 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchFraction {
    exponent: i32,
}

/// `1e-7, 1e-6, ..., 1e-1`.
pub const BATCH_LADDER: [BatchFraction; 7] = [
    BatchFraction { exponent: -7 },
    BatchFraction { exponent: -6 },
    BatchFraction { exponent: -5 },
    BatchFraction { exponent: -4 },
    BatchFraction { exponent: -3 },
    BatchFraction { exponent: -2 },
    BatchFraction { exponent: -1 },
];

impl BatchFraction {
    pub fn value(&self) -> f64 {
        10f64.powi(self.exponent)
    }

    /// `floor(value * edge_count)`, computed exactly.
    pub fn batch_size(&self, edge_count: u64) -> u64 {
        edge_count / 10u64.pow(self.exponent.unsigned_abs())
    }
}

impl fmt::Display for BatchFraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1e}", self.value())
    }
}

/// Batches that will run for a graph of `edge_count` edges.
pub fn plan(ladder: &[BatchFraction], edge_count: u64) -> Vec<(BatchFraction, u64)> {
    ladder
        .iter()
        .map(|&f| (f, f.batch_size(edge_count)))
        .filter(|&(_, b)| b >= 1)
        .collect()
}

fn by_score_desc(a: &ScoredPair, b: &ScoredPair) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then(a.u.cmp(&b.u))
        .then(a.v.cmp(&b.v))
}

/// The `k` best pairs by descending score, ties by ascending `(u, v)`.
/// Returns every pair when fewer than `k` exist.
pub fn top_k(pairs: &[ScoredPair], k: usize) -> Vec<ScoredPair> {
    if k == 0 {
        return Vec::new();
    }
    let mut out = pairs.to_vec();
    if k < out.len() {
        out.select_nth_unstable_by(k - 1, by_score_desc);
        out.truncate(k);
    }
    out.sort_unstable_by(by_score_desc);
    out
}

/// Measurements for one retained batch.
#[derive(Debug, Clone)]
pub struct BatchRun {
    pub fraction: BatchFraction,
    pub batch_size: u64,
    /// Candidate pairs produced by the scorer.
    pub scored: usize,
    /// Pairs actually extracted (saturates at `scored`).
    pub extracted: usize,
    /// Scorer headline runtime.
    pub score_time: Duration,
    /// Top-k extraction time, the reported metric.
    pub extract_time: Duration,
}

/// Run the sweep. `make` builds a fresh scorer per batch; `observe` sees each
/// finished batch before the next one starts.
pub fn run_sweep(
    graph: &Graph,
    ladder: &[BatchFraction],
    mut make: impl FnMut() -> Box<dyn Algorithm>,
    mut observe: impl FnMut(&BatchRun) -> Result<()>,
) -> Result<Vec<BatchRun>> {
    let edge_count = graph.edge_count() as u64;
    let mut runs = Vec::new();
    for (fraction, batch_size) in plan(ladder, edge_count) {
        let mut scorer = make();
        let invocation = runner::invoke(scorer.as_mut(), graph)?;
        let pairs = match invocation.result {
            AlgorithmResult::ScoredPairs(p) => p,
            other => {
                return Err(HarnessError::AlgorithmExecution {
                    algorithm: invocation.algorithm,
                    message: format!("expected scored pairs, got {}", other.kind()),
                });
            }
        };
        let k = usize::try_from(batch_size).unwrap_or(usize::MAX);
        let (top, extract_time) = timed(|| top_k(&pairs, k));
        let run = BatchRun {
            fraction,
            batch_size,
            scored: pairs.len(),
            extracted: top.len(),
            score_time: invocation.headline,
            extract_time,
        };
        debug!(%fraction, batch_size, extracted = run.extracted, "batch finished");
        observe(&run)?;
        runs.push(run);
    }
    Ok(runs)
}
