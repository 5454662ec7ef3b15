//! Shared test utilities: fixture paths and algorithm doubles.

#![allow(dead_code)]

use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use graph_harness::algorithm::{
    Algorithm, AlgorithmError, AlgorithmFamily, AlgorithmResult, Partition, ScoredPair,
};
use graph_harness::config::HarnessConfig;
use graph_harness::graph::Graph;
use graph_harness::harness;
use graph_harness::probe::ResourceProbe;
use graph_harness::report::{ReportLog, RunSummary};

// =============================================================================
// Fixture paths
// =============================================================================

pub fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
}

pub fn graph_fixture(name: &str) -> PathBuf {
    data_dir().join("graph").join(name)
}

/// Write a one-indexed edge list into `dir`.
pub fn write_graph(dir: &Path, name: &str, edges: &[(u32, u32)]) -> PathBuf {
    let body: String = edges.iter().map(|(u, v)| format!("{} {}\n", u, v)).collect();
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    path
}

// =============================================================================
// Running the pipeline into memory
// =============================================================================

pub fn run_captured(config: &HarnessConfig, probe: &ResourceProbe) -> (RunSummary, String) {
    let mut log = ReportLog::new(Vec::new(), "<memory>");
    let summary = harness::run(config, &mut log, probe).unwrap();
    (summary, String::from_utf8(log.into_inner()).unwrap())
}

// =============================================================================
// Algorithm doubles
// =============================================================================

/// Community detection that returns a fixed assignment.
pub struct FixedPartition(pub Vec<u64>);

impl Algorithm for FixedPartition {
    fn name(&self) -> &str {
        "Fixed"
    }

    fn family(&self) -> AlgorithmFamily {
        AlgorithmFamily::CommunityDetection
    }

    fn run(&mut self, _graph: &Graph) -> Result<(), AlgorithmError> {
        Ok(())
    }

    fn take_result(&mut self) -> Option<AlgorithmResult> {
        Some(AlgorithmResult::Partition(Partition::from_vec(self.0.clone())))
    }
}

/// Link predictor that scores a fixed number of pairs and counts its runs.
pub struct CountingScorer {
    pub pairs: usize,
    pub runs: Rc<Cell<usize>>,
}

impl Algorithm for CountingScorer {
    fn name(&self) -> &str {
        "Counting"
    }

    fn family(&self) -> AlgorithmFamily {
        AlgorithmFamily::LinkPrediction
    }

    fn run(&mut self, _graph: &Graph) -> Result<(), AlgorithmError> {
        self.runs.set(self.runs.get() + 1);
        Ok(())
    }

    fn take_result(&mut self) -> Option<AlgorithmResult> {
        let pairs = (0..self.pairs)
            .map(|i| ScoredPair { u: i, v: i + 1, score: (self.pairs - i) as f64 })
            .collect();
        Some(AlgorithmResult::ScoredPairs(pairs))
    }
}
