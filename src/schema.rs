//! Machine-readable run report.
//!
//! `graph-bench --json <path>` writes one of these next to the console log;
//! `bench-compare` reads two of them back.

use serde::{Deserialize, Serialize};

use crate::algorithm::AlgorithmFamily;

/// Top-level report written to a JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Schema version for forward compatibility.
    pub schema_version: u32,
    pub metadata: RunMetadata,
    pub results: Vec<RunRecord>,
}

/// Captured when the recorder is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    /// RFC 3339 timestamp of the run start.
    pub timestamp: String,
    pub harness_version: String,
    pub os: String,
    pub arch: String,
    /// Logical cores available to the process.
    pub cores: usize,
}

/// One measured run, or one batch of a sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    /// Unique key, e.g. `"PLP/web-Google"` or `"JaccardIndex/web-Google/1.0e-3"`.
    pub benchmark: String,
    pub algorithm: String,
    pub family: AlgorithmFamily,
    pub graph: String,
    pub nodes: usize,
    pub edges: usize,
    pub metrics: RunMetrics,
}

/// Fields that don't apply to a run are omitted from the JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunMetrics {
    pub runtime_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wall_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modularity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subsets: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pairs: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peak_rss_bytes: Option<u64>,
}
