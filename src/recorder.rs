//! Result recorder for saving run reports to JSON.

use std::path::{Path, PathBuf};

use crate::error::{HarnessError, Result};
use crate::graph::dataset_name;
use crate::report::RunSummary;
use crate::schema::{RunMetadata, RunMetrics, RunRecord, RunReport};
use crate::timing::as_millis_f64;

pub const SCHEMA_VERSION: u32 = 1;

/// Accumulates run records and writes them as one JSON report.
pub struct ResultRecorder {
    metadata: RunMetadata,
    results: Vec<RunRecord>,
}

impl Default for ResultRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultRecorder {
    /// Captures metadata (platform, timestamp) at construction time.
    pub fn new() -> Self {
        Self {
            metadata: RunMetadata {
                timestamp: chrono::Utc::now().to_rfc3339(),
                harness_version: env!("CARGO_PKG_VERSION").to_string(),
                os: std::env::consts::OS.to_string(),
                arch: std::env::consts::ARCH.to_string(),
                cores: std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(0),
            },
            results: Vec::new(),
        }
    }

    /// One record for the run, plus one per sweep batch.
    pub fn record_summary(&mut self, summary: &RunSummary) {
        let graph = dataset_name(&summary.graph);
        let peak = summary.peak_resident_bytes();

        if summary.batches.is_empty() {
            self.results.push(RunRecord {
                benchmark: format!("{}/{}", summary.algorithm, graph),
                algorithm: summary.algorithm.clone(),
                family: summary.family,
                graph: graph.clone(),
                nodes: summary.stats.nodes,
                edges: summary.stats.edges,
                metrics: RunMetrics {
                    runtime_ms: as_millis_f64(summary.headline),
                    wall_ms: Some(as_millis_f64(summary.wall)),
                    modularity: summary.modularity,
                    subsets: summary.subsets,
                    peak_rss_bytes: peak,
                    ..Default::default()
                },
            });
            return;
        }

        for batch in &summary.batches {
            self.results.push(RunRecord {
                benchmark: format!("{}/{}/{}", summary.algorithm, graph, batch.fraction),
                algorithm: summary.algorithm.clone(),
                family: summary.family,
                graph: graph.clone(),
                nodes: summary.stats.nodes,
                edges: summary.stats.edges,
                metrics: RunMetrics {
                    runtime_ms: as_millis_f64(batch.extract_time),
                    batch_size: Some(batch.batch_size),
                    pairs: Some(batch.extracted),
                    peak_rss_bytes: peak,
                    ..Default::default()
                },
            });
        }
    }

    pub fn results(&self) -> &[RunRecord] {
        &self.results
    }

    /// Write all accumulated records to `path`.
    pub fn save(self, path: &Path) -> Result<PathBuf> {
        let report = RunReport {
            schema_version: SCHEMA_VERSION,
            metadata: self.metadata,
            results: self.results,
        };
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| HarnessError::io(path, std::io::Error::other(e)))?;
        std::fs::write(path, json).map_err(|e| HarnessError::io(path, e))?;
        tracing::info!(path = %path.display(), "run report saved");
        Ok(path.to_path_buf())
    }
}

/// Read a report written by [`ResultRecorder::save`].
pub fn load_report(path: &Path) -> Result<RunReport> {
    let contents = std::fs::read_to_string(path).map_err(|e| HarnessError::io(path, e))?;
    serde_json::from_str(&contents).map_err(|e| HarnessError::io(path, std::io::Error::other(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::AlgorithmFamily;
    use crate::graph::GraphStats;
    use crate::sweep::{BatchRun, BATCH_LADDER};
    use std::time::Duration;

    fn summary(algorithm: &str, family: AlgorithmFamily) -> RunSummary {
        RunSummary {
            graph: PathBuf::from("/data/web-Google.mtx.elist"),
            stats: GraphStats { nodes: 10, edges: 20, directed: false, weighted: false },
            algorithm: algorithm.to_string(),
            family,
            headline: Duration::from_millis(3),
            wall: Duration::from_millis(5),
            modularity: Some(0.5),
            subsets: Some(2),
            snapshots: vec![],
            batches: vec![],
        }
    }

    #[test]
    fn single_run_is_one_record() {
        let mut rec = ResultRecorder::new();
        rec.record_summary(&summary("PLP", AlgorithmFamily::CommunityDetection));
        let r = &rec.results()[0];
        assert_eq!(rec.results().len(), 1);
        assert_eq!(r.benchmark, "PLP/web-Google");
        assert_eq!(r.metrics.runtime_ms, 3.0);
        assert_eq!(r.metrics.wall_ms, Some(5.0));
        assert_eq!(r.metrics.subsets, Some(2));
    }

    #[test]
    fn sweep_records_one_per_batch() {
        let mut s = summary("JaccardIndex", AlgorithmFamily::LinkPrediction);
        s.modularity = None;
        s.subsets = None;
        s.batches = vec![
            BatchRun {
                fraction: BATCH_LADDER[5],
                batch_size: 1,
                scored: 4,
                extracted: 1,
                score_time: Duration::from_millis(1),
                extract_time: Duration::from_millis(2),
            },
            BatchRun {
                fraction: BATCH_LADDER[6],
                batch_size: 2,
                scored: 4,
                extracted: 2,
                score_time: Duration::from_millis(1),
                extract_time: Duration::from_millis(4),
            },
        ];
        let mut rec = ResultRecorder::new();
        rec.record_summary(&s);
        let names: Vec<&str> = rec.results().iter().map(|r| r.benchmark.as_str()).collect();
        assert_eq!(names, vec!["JaccardIndex/web-Google/1.0e-2", "JaccardIndex/web-Google/1.0e-1"]);
        assert_eq!(rec.results()[1].metrics.batch_size, Some(2));
        assert_eq!(rec.results()[1].metrics.runtime_ms, 4.0);
    }

    #[test]
    fn save_and_load_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let mut rec = ResultRecorder::new();
        rec.record_summary(&summary("Louvain", AlgorithmFamily::CommunityDetection));
        rec.save(&path).unwrap();

        let report = load_report(&path).unwrap();
        assert_eq!(report.schema_version, SCHEMA_VERSION);
        assert_eq!(report.metadata.harness_version, env!("CARGO_PKG_VERSION"));
        assert_eq!(report.results[0].metrics.modularity, Some(0.5));
    }

    #[test]
    fn save_into_missing_dir_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ResultRecorder::new().save(&dir.path().join("nope/report.json")).unwrap_err();
        assert_eq!(err.stage(), "write");
    }
}
