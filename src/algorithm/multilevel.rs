//! Multilevel modularity optimisation (Louvain and Leiden).
//!
//! Each level runs three steps:
//!
//! 1. **move**: greedily move nodes to the neighbouring community with the
//!    highest modularity gain until a sweep gains less than the tolerance.
//! 2. **refine** (Leiden only): split every community into its connected
//!    components so no community is internally disconnected.
//! 3. **coarsen**: contract communities into nodes of the next level.
//!
//! Louvain times the final relabelling as `bookkeeping`, which is not part of
//! its headline runtime. Leiden folds it into its last `coarsen` entry.

use std::collections::{BTreeMap, VecDeque};

use tracing::debug;

use super::{Algorithm, AlgorithmError, AlgorithmFamily, AlgorithmResult, Parameters, Partition};
use crate::graph::Graph;
use crate::timing::PhaseTiming;

const DEFAULT_MAX_ITERATIONS: usize = 32;
const DEFAULT_TOLERANCE: f64 = 1e-6;
const MAX_LEVELS: usize = 32;

const LOUVAIN_COUNTED: &[&str] = &["coarsen", "move"];
const LEIDEN_COUNTED: &[&str] = &["move", "refine", "coarsen"];

/// Weighted undirected graph at one level of the hierarchy.
#[derive(Debug, Clone)]
struct Level {
    adj: Vec<Vec<(usize, f64)>>,
    loops: Vec<f64>,
    degree: Vec<f64>,
}

impl Level {
    fn from_graph(graph: &Graph) -> Self {
        let n = graph.node_count();
        let mut adj = vec![Vec::new(); n];
        let mut loops = vec![0.0; n];
        for (u, v, w) in graph.edges() {
            if u == v {
                loops[u] += w;
            } else {
                adj[u].push((v, w));
                adj[v].push((u, w));
            }
        }
        Level::with_degrees(adj, loops)
    }

    fn with_degrees(adj: Vec<Vec<(usize, f64)>>, loops: Vec<f64>) -> Self {
        let degree = adj
            .iter()
            .zip(&loops)
            .map(|(nbrs, l)| nbrs.iter().map(|(_, w)| w).sum::<f64>() + 2.0 * l)
            .collect();
        Level { adj, loops, degree }
    }

    fn len(&self) -> usize {
        self.adj.len()
    }

    /// Sum of degrees, i.e. twice the total edge weight.
    fn volume(&self) -> f64 {
        self.degree.iter().sum()
    }
}

/// Local moving. Returns dense community ids and whether any node moved.
fn local_moving(level: &Level, max_iterations: usize, tolerance: f64) -> (Vec<usize>, bool) {
    let n = level.len();
    let m2 = level.volume();
    let mut comm: Vec<usize> = (0..n).collect();
    if m2 == 0.0 {
        return (comm, false);
    }

    let mut total = level.degree.clone();
    let mut scratch = vec![0.0; n];
    let mut touched: Vec<usize> = Vec::new();
    let mut moved_any = false;

    for _ in 0..max_iterations {
        let mut gain_sum = 0.0;
        let mut moves = 0usize;

        for u in 0..n {
            let current = comm[u];
            let k = level.degree[u];

            for &(v, w) in &level.adj[u] {
                let c = comm[v];
                if scratch[c] == 0.0 {
                    touched.push(c);
                }
                scratch[c] += w;
            }

            total[current] -= k;
            let stay = scratch[current] - total[current] * k / m2;
            let mut best = current;
            let mut best_gain = stay;
            for &c in &touched {
                let gain = scratch[c] - total[c] * k / m2;
                if gain > best_gain {
                    best = c;
                    best_gain = gain;
                }
            }
            total[best] += k;

            for &c in &touched {
                scratch[c] = 0.0;
            }
            touched.clear();

            if best != current {
                comm[u] = best;
                moves += 1;
                gain_sum += 2.0 * (best_gain - stay) / m2;
            }
        }

        if moves > 0 {
            moved_any = true;
        }
        if moves == 0 || gain_sum < tolerance {
            break;
        }
    }

    (renumber(&comm), moved_any)
}

/// Split each community into connected components of its induced subgraph.
fn refine(level: &Level, comm: &[usize]) -> Vec<usize> {
    let n = level.len();
    let mut refined = vec![usize::MAX; n];
    let mut next = 0;
    let mut queue = VecDeque::new();
    for start in 0..n {
        if refined[start] != usize::MAX {
            continue;
        }
        refined[start] = next;
        queue.push_back(start);
        while let Some(u) = queue.pop_front() {
            for &(v, _) in &level.adj[u] {
                if refined[v] == usize::MAX && comm[v] == comm[u] {
                    refined[v] = next;
                    queue.push_back(v);
                }
            }
        }
        next += 1;
    }
    refined
}

/// Contract `comm` (dense ids `0..k`) into the next level.
fn coarsen(level: &Level, comm: &[usize], k: usize) -> Level {
    let mut links: Vec<BTreeMap<usize, f64>> = vec![BTreeMap::new(); k];
    let mut loops = vec![0.0; k];
    for u in 0..level.len() {
        let cu = comm[u];
        loops[cu] += level.loops[u];
        for &(v, w) in &level.adj[u] {
            let cv = comm[v];
            if cu == cv {
                // each internal edge is seen from both ends
                loops[cu] += w / 2.0;
            } else {
                *links[cu].entry(cv).or_insert(0.0) += w;
            }
        }
    }
    let adj = links.into_iter().map(|m| m.into_iter().collect()).collect();
    Level::with_degrees(adj, loops)
}

fn renumber(comm: &[usize]) -> Vec<usize> {
    let mut ids = vec![usize::MAX; comm.len()];
    let mut next = 0;
    comm.iter()
        .map(|&c| {
            if ids[c] == usize::MAX {
                ids[c] = next;
                next += 1;
            }
            ids[c]
        })
        .collect()
}

#[derive(Debug, Clone)]
struct Multilevel {
    name: &'static str,
    refine: bool,
    params: Parameters,
    timing: PhaseTiming,
    result: Option<Partition>,
}

impl Multilevel {
    fn new(name: &'static str, refine: bool, params: Parameters) -> Self {
        Multilevel {
            name,
            refine,
            params,
            timing: PhaseTiming::new(),
            result: None,
        }
    }

    fn run(&mut self, graph: &Graph) -> Result<(), AlgorithmError> {
        let max_iterations = self.params.checked_max_iterations(DEFAULT_MAX_ITERATIONS)?;
        let tolerance = self.params.checked_tolerance(DEFAULT_TOLERANCE)?;
        if graph.node_count() == 0 {
            return Err(AlgorithmError::EmptyGraph);
        }

        let mut timing = PhaseTiming::new();
        let mut level = Level::from_graph(graph);
        let mut membership: Vec<usize> = (0..graph.node_count()).collect();
        let mut levels = 0;

        while levels < MAX_LEVELS {
            let (comm, moved) = timing.measure("move", || local_moving(&level, max_iterations, tolerance));
            if !moved {
                break;
            }
            let comm = if self.refine {
                timing.measure("refine", || refine(&level, &comm))
            } else {
                comm
            };
            let k = comm.iter().max().map_or(0, |&c| c + 1);
            let before = level.len();
            timing.measure("coarsen", || {
                level = coarsen(&level, &comm, k);
                for m in membership.iter_mut() {
                    *m = comm[*m];
                }
            });
            levels += 1;
            debug!(algorithm = self.name, level = levels, nodes = k, "coarsened");
            if k == before {
                break;
            }
        }

        let phase = if self.refine { "coarsen" } else { "bookkeeping" };
        let partition = timing.measure(phase, || {
            Partition::from_vec(membership.iter().map(|&c| c as u64).collect())
        });

        self.timing = timing;
        self.result = Some(partition);
        Ok(())
    }
}

macro_rules! multilevel_algorithm {
    ($(#[$doc:meta])* $ty:ident, $name:expr, $refine:expr, $counted:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone)]
        pub struct $ty(Multilevel);

        impl $ty {
            pub fn new(params: Parameters) -> Self {
                $ty(Multilevel::new($name, $refine, params))
            }
        }

        impl Algorithm for $ty {
            fn name(&self) -> &str {
                $name
            }

            fn family(&self) -> AlgorithmFamily {
                AlgorithmFamily::CommunityDetection
            }

            fn run(&mut self, graph: &Graph) -> Result<(), AlgorithmError> {
                self.0.run(graph)
            }

            fn take_result(&mut self) -> Option<AlgorithmResult> {
                self.0.result.take().map(AlgorithmResult::Partition)
            }

            fn phase_timing(&self) -> Option<&PhaseTiming> {
                Some(&self.0.timing)
            }

            fn counted_phases(&self) -> &[&'static str] {
                $counted
            }
        }
    };
}

multilevel_algorithm!(
    /// Louvain: local moving plus coarsening.
    Louvain, "Louvain", false, LOUVAIN_COUNTED
);
multilevel_algorithm!(
    /// Leiden: Louvain with connected-component refinement before coarsening.
    Leiden, "Leiden", true, LEIDEN_COUNTED
);
