//! Error taxonomy for the harness.
//!
//! Every kind except [`HarnessError::ResourceProbeUnavailable`] aborts the
//! current run. Nothing here is retried.

use std::io;
use std::path::PathBuf;

/// Result alias used throughout the harness.
pub type Result<T> = std::result::Result<T, HarnessError>;

/// Failures surfaced by the harness stages.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// Input graph is missing, unreadable or malformed.
    #[error("failed to load graph {}: {reason}", path.display())]
    GraphLoad { path: PathBuf, reason: String },

    /// The delegated algorithm signalled a failure.
    #[error("{algorithm} failed: {message}")]
    AlgorithmExecution { algorithm: String, message: String },

    /// A partition does not assign every node of the graph.
    #[error("partition covers {} of {node_count} nodes", node_count - missing)]
    PartitionCoverage { missing: usize, node_count: usize },

    /// Memory figures are not exposed on this platform.
    #[error("resource probe unavailable: {0}")]
    ResourceProbeUnavailable(String),

    /// Output could not be created or written.
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl HarnessError {
    /// Pipeline stage the error belongs to, used as a message prefix.
    pub fn stage(&self) -> &'static str {
        match self {
            HarnessError::GraphLoad { .. } => "load",
            HarnessError::AlgorithmExecution { .. } => "run",
            HarnessError::PartitionCoverage { .. } => "evaluate",
            HarnessError::ResourceProbeUnavailable(_) => "probe",
            HarnessError::Io { .. } => "write",
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        HarnessError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn load(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        HarnessError::GraphLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
