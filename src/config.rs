//! Run configuration.
//!
//! [`Cli`] is the `graph-bench` command line; [`HarnessConfig`] is the
//! validated form the pipeline consumes. Library users can build a
//! `HarnessConfig` directly and call [`HarnessConfig::validate`].

use std::path::PathBuf;

use clap::Parser;
use tracing::warn;

use crate::algorithm::{AlgorithmFamily, AlgorithmKind, Parameters};
use crate::graph::expand_home;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("persisting a partition needs an output path")]
    MissingOutputPath,

    #[error("{algorithm} does not produce a partition to persist")]
    NothingToPersist { algorithm: &'static str },

    #[error("first node id must be 0 or 1, got {0}")]
    FirstNode(u32),
}

/// Benchmark one graph algorithm on an edge-list graph.
#[derive(Parser, Debug, Clone)]
#[command(name = "graph-bench", version, about, long_about = None)]
pub struct Cli {
    /// Edge-list file to load (`~` is expanded)
    pub graph: String,

    /// Where to write the partition (community detection only)
    pub output: Option<String>,

    /// Algorithm to benchmark
    #[arg(short, long, value_enum, default_value_t = AlgorithmKind::Plp)]
    pub algorithm: AlgorithmKind,

    /// Iteration cap passed to the algorithm
    #[arg(long)]
    pub max_iterations: Option<usize>,

    /// Convergence tolerance passed to the algorithm
    #[arg(long)]
    pub tolerance: Option<f64>,

    /// Take memory snapshots at each checkpoint
    #[arg(long)]
    pub probe_memory: bool,

    /// Node ids in the file start at zero instead of one
    #[arg(long)]
    pub zero_indexed: bool,

    /// Also write a JSON run report to this path
    #[arg(long, value_name = "PATH")]
    pub json: Option<String>,
}

/// Stages a run may skip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stages {
    pub persist_partition: bool,
    pub probe_memory: bool,
}

#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub graph_path: PathBuf,
    pub output_path: Option<PathBuf>,
    pub algorithm: AlgorithmKind,
    pub parameters: Parameters,
    pub stages: Stages,
    /// Smallest node id in the input file.
    pub first_node: u32,
    pub json_report: Option<PathBuf>,
}

impl HarnessConfig {
    /// A timing-only run of `algorithm` on `graph_path`.
    pub fn new(graph_path: impl Into<PathBuf>, algorithm: AlgorithmKind) -> Self {
        HarnessConfig {
            graph_path: graph_path.into(),
            output_path: None,
            algorithm,
            parameters: Parameters::default(),
            stages: Stages::default(),
            first_node: 1,
            json_report: None,
        }
    }

    /// Persist the partition to `path`.
    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self.stages.persist_partition = true;
        self
    }

    pub fn with_probe(mut self, probe_memory: bool) -> Self {
        self.stages.probe_memory = probe_memory;
        self
    }

    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        let mut output_path = cli.output.as_deref().map(expand_home);
        if output_path.is_some() && cli.algorithm.family() != AlgorithmFamily::CommunityDetection {
            warn!(
                algorithm = cli.algorithm.name(),
                "output path ignored: only community detection writes a partition"
            );
            output_path = None;
        }
        let config = HarnessConfig {
            graph_path: expand_home(&cli.graph),
            stages: Stages {
                persist_partition: output_path.is_some(),
                probe_memory: cli.probe_memory,
            },
            output_path,
            algorithm: cli.algorithm,
            parameters: Parameters {
                max_iterations: cli.max_iterations,
                tolerance: cli.tolerance,
            },
            first_node: if cli.zero_indexed { 0 } else { 1 },
            json_report: cli.json.as_deref().map(expand_home),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.first_node > 1 {
            return Err(ConfigError::FirstNode(self.first_node));
        }
        if self.stages.persist_partition {
            if self.output_path.is_none() {
                return Err(ConfigError::MissingOutputPath);
            }
            if self.algorithm.family() != AlgorithmFamily::CommunityDetection {
                return Err(ConfigError::NothingToPersist { algorithm: self.algorithm.name() });
            }
        }
        Ok(())
    }
}
