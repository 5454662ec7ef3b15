//! The contract between the harness and the graph algorithms it benchmarks.
//!
//! An [`Algorithm`] is run once against a borrowed [`Graph`], after which its
//! result is taken through [`Algorithm::take_result`]. Algorithms that time
//! their own internal stages expose a [`PhaseTiming`] together with the
//! allow-list of phases that make up their headline runtime.
//!
//! ## Families
//!
//! - **Community detection**: PLP (parallel label propagation style), Louvain
//!   (multilevel modularity moving) and Leiden (Louvain with a refinement step
//!   that keeps communities connected). Result: [`Partition`].
//! - **Centrality**: PageRank. Result: [`Ranking`].
//! - **Link prediction**: Jaccard index over candidate pairs. Result: a list of
//!   [`ScoredPair`].

mod jaccard;
mod multilevel;
mod pagerank;
mod plp;

pub use jaccard::JaccardIndex;
pub use multilevel::{Leiden, Louvain};
pub use pagerank::PageRank;
pub use plp::Plp;

use std::collections::BTreeSet;
use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::graph::Graph;
use crate::timing::PhaseTiming;

/// Failures signalled by an algorithm itself.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AlgorithmError {
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter { name: &'static str, message: String },

    #[error("did not converge after {iterations} iterations")]
    NotConverged { iterations: usize },

    #[error("graph has no nodes")]
    EmptyGraph,
}

/// Tunables handed to an algorithm when it is built.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Parameters {
    pub max_iterations: Option<usize>,
    pub tolerance: Option<f64>,
}

impl Parameters {
    pub fn is_empty(&self) -> bool {
        self.max_iterations.is_none() && self.tolerance.is_none()
    }

    pub(crate) fn checked_tolerance(&self, default: f64) -> Result<f64, AlgorithmError> {
        match self.tolerance {
            Some(t) if !(t.is_finite() && t > 0.0) => Err(AlgorithmError::InvalidParameter {
                name: "tolerance",
                message: format!("must be a positive number, got {}", t),
            }),
            Some(t) => Ok(t),
            None => Ok(default),
        }
    }

    pub(crate) fn checked_max_iterations(&self, default: usize) -> Result<usize, AlgorithmError> {
        match self.max_iterations {
            Some(0) => Err(AlgorithmError::InvalidParameter {
                name: "max_iterations",
                message: "must be at least 1".to_string(),
            }),
            Some(n) => Ok(n),
            None => Ok(default),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlgorithmFamily {
    CommunityDetection,
    Centrality,
    LinkPrediction,
}

impl fmt::Display for AlgorithmFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AlgorithmFamily::CommunityDetection => "community-detection",
            AlgorithmFamily::Centrality => "centrality",
            AlgorithmFamily::LinkPrediction => "link-prediction",
        };
        f.write_str(s)
    }
}

/// The closed set of algorithms the harness can benchmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AlgorithmKind {
    Plp,
    Louvain,
    Leiden,
    #[value(name = "pagerank")]
    PageRank,
    Jaccard,
}

impl AlgorithmKind {
    pub const ALL: [AlgorithmKind; 5] = [
        AlgorithmKind::Plp,
        AlgorithmKind::Louvain,
        AlgorithmKind::Leiden,
        AlgorithmKind::PageRank,
        AlgorithmKind::Jaccard,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AlgorithmKind::Plp => "PLP",
            AlgorithmKind::Louvain => "Louvain",
            AlgorithmKind::Leiden => "Leiden",
            AlgorithmKind::PageRank => "PageRank",
            AlgorithmKind::Jaccard => "JaccardIndex",
        }
    }

    pub fn family(&self) -> AlgorithmFamily {
        match self {
            AlgorithmKind::Plp | AlgorithmKind::Louvain | AlgorithmKind::Leiden => {
                AlgorithmFamily::CommunityDetection
            }
            AlgorithmKind::PageRank => AlgorithmFamily::Centrality,
            AlgorithmKind::Jaccard => AlgorithmFamily::LinkPrediction,
        }
    }

    pub fn build(&self, params: Parameters) -> Box<dyn Algorithm> {
        match self {
            AlgorithmKind::Plp => Box::new(Plp::new(params)),
            AlgorithmKind::Louvain => Box::new(Louvain::new(params)),
            AlgorithmKind::Leiden => Box::new(Leiden::new(params)),
            AlgorithmKind::PageRank => Box::new(PageRank::new(params)),
            AlgorithmKind::Jaccard => Box::new(JaccardIndex::new(params)),
        }
    }
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A graph algorithm under benchmark.
///
/// `run` must not mutate the graph and must fail rather than leave a partial
/// result behind.
pub trait Algorithm {
    fn name(&self) -> &str;

    fn family(&self) -> AlgorithmFamily;

    fn run(&mut self, graph: &Graph) -> Result<(), AlgorithmError>;

    /// Hand over the result of the last successful `run`.
    fn take_result(&mut self) -> Option<AlgorithmResult>;

    /// Internal stage breakdown, if the algorithm times itself.
    fn phase_timing(&self) -> Option<&PhaseTiming> {
        None
    }

    /// Phases of [`Algorithm::phase_timing`] that make up the headline runtime.
    fn counted_phases(&self) -> &[&'static str] {
        &[]
    }
}

/// Tagged union over the result shapes the harness consumes.
#[derive(Debug, Clone, PartialEq)]
pub enum AlgorithmResult {
    Partition(Partition),
    Ranking(Ranking),
    ScoredPairs(Vec<ScoredPair>),
}

impl AlgorithmResult {
    pub fn kind(&self) -> &'static str {
        match self {
            AlgorithmResult::Partition(_) => "partition",
            AlgorithmResult::Ranking(_) => "ranking",
            AlgorithmResult::ScoredPairs(_) => "scored pairs",
        }
    }
}

/// Assignment of nodes `0..len` to community ids.
///
/// Slots may be unassigned; consumers that need full coverage check
/// [`Partition::missing`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Partition {
    subsets: Vec<Option<u64>>,
}

impl Partition {
    /// `node_count` unassigned slots.
    pub fn new(node_count: usize) -> Self {
        Partition { subsets: vec![None; node_count] }
    }

    pub fn from_vec(assignment: Vec<u64>) -> Self {
        Partition { subsets: assignment.into_iter().map(Some).collect() }
    }

    /// Build from `(node, community)` pairs in any order.
    pub fn from_pairs(node_count: usize, pairs: impl IntoIterator<Item = (usize, u64)>) -> Self {
        let mut p = Partition::new(node_count);
        for (node, community) in pairs {
            p.set(node, community);
        }
        p
    }

    /// Assign `node`, growing the slot range if needed.
    pub fn set(&mut self, node: usize, community: u64) {
        if node >= self.subsets.len() {
            self.subsets.resize(node + 1, None);
        }
        self.subsets[node] = Some(community);
    }

    pub fn get(&self, node: usize) -> Option<u64> {
        self.subsets.get(node).copied().flatten()
    }

    /// Number of node slots, assigned or not.
    pub fn len(&self) -> usize {
        self.subsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subsets.is_empty()
    }

    /// Count of nodes in `0..node_count` without a community.
    pub fn missing(&self, node_count: usize) -> usize {
        (0..node_count).filter(|&u| self.get(u).is_none()).count()
    }

    /// Number of distinct community ids in use.
    pub fn number_of_subsets(&self) -> usize {
        self.subsets.iter().flatten().collect::<BTreeSet<_>>().len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, Option<u64>)> + '_ {
        self.subsets.iter().copied().enumerate()
    }
}

/// Per-node centrality scores.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Ranking {
    scores: Vec<f64>,
}

impl Ranking {
    pub fn new(scores: Vec<f64>) -> Self {
        Ranking { scores }
    }

    pub fn score(&self, node: usize) -> Option<f64> {
        self.scores.get(node).copied()
    }

    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// The `k` highest scoring nodes, best first; ties go to the lower id.
    pub fn top(&self, k: usize) -> Vec<(usize, f64)> {
        let mut ranked: Vec<(usize, f64)> = self.scores.iter().copied().enumerate().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(k);
        ranked
    }
}

/// A candidate node pair with its link-prediction score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredPair {
    pub u: usize,
    pub v: usize,
    pub score: f64,
}
