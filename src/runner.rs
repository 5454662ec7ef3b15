//! Uniform invocation of an [`Algorithm`].
//!
//! The stopwatch brackets only `run()`. Result extraction happens afterwards
//! and is not part of the measured interval.

use std::time::Duration;

use tracing::{debug, info};

use crate::algorithm::{Algorithm, AlgorithmFamily, AlgorithmResult};
use crate::error::{HarnessError, Result};
use crate::graph::Graph;
use crate::timing::{PhaseTiming, Stopwatch};

/// Outcome of one algorithm invocation.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub algorithm: String,
    pub family: AlgorithmFamily,
    pub result: AlgorithmResult,
    /// Wall-clock time of `run()`.
    pub elapsed: Duration,
    /// Headline runtime: allow-listed phase total, or `elapsed` when the
    /// algorithm reports no phases.
    pub headline: Duration,
    pub phases: Option<PhaseTiming>,
}

impl Invocation {
    /// Per-phase sums of everything the algorithm reported, in report order.
    pub fn phase_totals(&self) -> Vec<(String, Duration)> {
        self.phases
            .iter()
            .flat_map(|t| t.phases())
            .map(|(name, list)| (name.to_string(), Stopwatch::sum(list)))
            .collect()
    }
}

/// Run `algorithm` on `graph` and collect its result and timings.
pub fn invoke(algorithm: &mut dyn Algorithm, graph: &Graph) -> Result<Invocation> {
    let name = algorithm.name().to_string();
    let family = algorithm.family();
    info!(algorithm = %name, %family, "invoking");

    let mut sw = Stopwatch::started();
    let outcome = algorithm.run(graph);
    let elapsed = sw.stop();

    outcome.map_err(|e| HarnessError::AlgorithmExecution {
        algorithm: name.clone(),
        message: e.to_string(),
    })?;

    let result = algorithm.take_result().ok_or_else(|| HarnessError::AlgorithmExecution {
        algorithm: name.clone(),
        message: "run completed without a result".to_string(),
    })?;
    check_shape(&name, family, &result, graph.node_count())?;

    let phases = algorithm.phase_timing().filter(|t| !t.is_empty()).cloned();
    let headline = match &phases {
        Some(t) => t.total(algorithm.counted_phases()),
        None => elapsed,
    };
    debug!(algorithm = %name, ?elapsed, ?headline, "invocation finished");

    Ok(Invocation {
        algorithm: name,
        family,
        result,
        elapsed,
        headline,
        phases,
    })
}

fn check_shape(
    name: &str,
    family: AlgorithmFamily,
    result: &AlgorithmResult,
    node_count: usize,
) -> Result<()> {
    let ok = matches!(
        (family, result),
        (AlgorithmFamily::CommunityDetection, AlgorithmResult::Partition(_))
            | (AlgorithmFamily::Centrality, AlgorithmResult::Ranking(_))
            | (AlgorithmFamily::LinkPrediction, AlgorithmResult::ScoredPairs(_))
    );
    if !ok {
        return Err(HarnessError::AlgorithmExecution {
            algorithm: name.to_string(),
            message: format!("{} algorithm returned {}", family, result.kind()),
        });
    }
    // one slot per node, assigned or not
    if let AlgorithmResult::Partition(partition) = result {
        if partition.len() != node_count {
            return Err(HarnessError::AlgorithmExecution {
                algorithm: name.to_string(),
                message: format!(
                    "partition has {} slots for {} nodes",
                    partition.len(),
                    node_count
                ),
            });
        }
    }
    Ok(())
}
