//! The benchmark pipeline.
//!
//! ```text
//! load -> invoke -> evaluate / persist    (community detection)
//! load -> invoke                          (centrality)
//! load -> sweep(invoke -> top-k)          (link prediction)
//! ```
//!
//! Stages run strictly one after another. Memory checkpoints, when enabled,
//! are taken before load, after load, after the algorithm and after result
//! extraction.

use std::io::Write;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::algorithm::{Algorithm, AlgorithmFamily, AlgorithmResult};
use crate::config::HarnessConfig;
use crate::error::{HarnessError, Result};
use crate::graph::{EdgeListReader, Graph};
use crate::output::write_partition;
use crate::probe::{Checkpoint, ResourceProbe, ResourceSnapshot};
use crate::quality::modularity;
use crate::report::{ReportLog, RunSummary};
use crate::runner;
use crate::sweep::{self, BATCH_LADDER};
use crate::timing::Stopwatch;

/// Logs each snapshot as it is taken. After the first probe failure it stays
/// silent; snapshots already logged are kept.
struct Checkpoints<'a> {
    probe: Option<&'a ResourceProbe>,
    snapshots: Vec<ResourceSnapshot>,
}

impl<'a> Checkpoints<'a> {
    fn new(probe: Option<&'a ResourceProbe>) -> Self {
        Checkpoints { probe, snapshots: Vec::new() }
    }

    fn take<W: Write>(&mut self, checkpoint: Checkpoint, log: &mut ReportLog<W>) -> Result<()> {
        let Some(probe) = self.probe else {
            return Ok(());
        };
        match probe.checkpoint(checkpoint) {
            Ok(snapshot) => {
                debug!(label = %snapshot.label, rss = snapshot.resident_bytes, "memory checkpoint");
                log.memory(&snapshot)?;
                self.snapshots.push(snapshot);
                Ok(())
            }
            Err(HarnessError::ResourceProbeUnavailable(reason)) => {
                warn!(%reason, "memory probe unavailable, omitting memory figures");
                self.probe = None;
                log.memory_unavailable(&reason)
            }
            Err(e) => Err(e),
        }
    }
}

/// Run the benchmark described by `config`.
pub fn run<W: Write>(
    config: &HarnessConfig,
    log: &mut ReportLog<W>,
    probe: &ResourceProbe,
) -> Result<RunSummary> {
    run_with(config, log, probe, || config.algorithm.build(config.parameters))
}

/// Like [`run`], with `make` supplying the algorithm instances. Sweeps call
/// it once per batch.
pub fn run_with<W: Write>(
    config: &HarnessConfig,
    log: &mut ReportLog<W>,
    probe: &ResourceProbe,
    mut make: impl FnMut() -> Box<dyn Algorithm>,
) -> Result<RunSummary> {
    let mut wall = Stopwatch::started();
    let mut memory = Checkpoints::new(config.stages.probe_memory.then_some(probe));
    memory.take(Checkpoint::Initial, log)?;

    log.reading_graph(&config.graph_path)?;
    let reader = EdgeListReader { first_node: config.first_node };
    let graph = reader.read(&config.graph_path)?;
    let stats = graph.stats();
    log.graph_loaded(&config.graph_path, &stats)?;
    info!(nodes = stats.nodes, edges = stats.edges, "graph loaded");
    memory.take(Checkpoint::AfterLoad, log)?;

    let mut algorithm = make();
    let name = algorithm.name().to_string();
    let family = algorithm.family();
    log.running(&name, family)?;

    let mut summary = RunSummary {
        graph: config.graph_path.clone(),
        stats,
        algorithm: name.clone(),
        family,
        headline: Duration::ZERO,
        wall: Duration::ZERO,
        modularity: None,
        subsets: None,
        snapshots: Vec::new(),
        batches: Vec::new(),
    };

    if family == AlgorithmFamily::LinkPrediction {
        let mut spare = Some(algorithm);
        let batches = sweep::run_sweep(
            &graph,
            &BATCH_LADDER,
            || spare.take().unwrap_or_else(&mut make),
            |batch| log.batch(&name, batch),
        )?;
        if batches.is_empty() {
            info!(edges = stats.edges, "graph too small for any batch fraction");
        }
        memory.take(Checkpoint::AfterRun, log)?;
        summary.headline = batches.iter().map(|b| b.extract_time).sum();
        summary.batches = batches;
        memory.take(Checkpoint::AfterResultExtraction, log)?;
    } else {
        let invocation = runner::invoke(algorithm.as_mut(), &graph)?;
        memory.take(Checkpoint::AfterRun, log)?;
        summary.headline = invocation.headline;
        extract(config, &graph, &invocation.result, &mut summary, log)?;
        log.phases(&invocation)?;
        memory.take(Checkpoint::AfterResultExtraction, log)?;
    }

    summary.wall = wall.stop();
    summary.snapshots = memory.snapshots;
    summary.emit(log)?;
    Ok(summary)
}

fn extract<W: Write>(
    config: &HarnessConfig,
    graph: &Graph,
    result: &AlgorithmResult,
    summary: &mut RunSummary,
    log: &mut ReportLog<W>,
) -> Result<()> {
    match result {
        AlgorithmResult::Partition(partition) => {
            let q = modularity(graph, partition)?;
            let subsets = partition.number_of_subsets();
            log.runtime(&summary.algorithm, summary.headline, Some(q))?;
            log.subsets(subsets)?;
            summary.modularity = Some(q);
            summary.subsets = Some(subsets);
            if config.stages.persist_partition {
                if let Some(path) = &config.output_path {
                    write_partition(path, partition)?;
                    info!(path = %path.display(), "partition written");
                }
            }
        }
        AlgorithmResult::Ranking(ranking) => {
            log.runtime(&summary.algorithm, summary.headline, None)?;
            debug!(top = ?ranking.top(5), "highest ranked nodes");
        }
        AlgorithmResult::ScoredPairs(pairs) => {
            log.runtime(&summary.algorithm, summary.headline, None)?;
            debug!(pairs = pairs.len(), "scored pairs outside a sweep");
        }
    }
    Ok(())
}
