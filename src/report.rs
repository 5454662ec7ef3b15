//! Line-oriented benchmark report.
//!
//! Every line is flushed as soon as it is written, so a run killed part way
//! still leaves a usable log. The line shapes are what `bench-process` parses.

use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::algorithm::AlgorithmFamily;
use crate::error::{HarnessError, Result};
use crate::graph::GraphStats;
use crate::probe::ResourceSnapshot;
use crate::runner::Invocation;
use crate::sweep::BatchRun;
use crate::timing::as_millis_f64;

/// Append-only report sink.
pub struct ReportLog<W: Write> {
    out: W,
    name: PathBuf,
}

impl ReportLog<io::Stdout> {
    pub fn stdout() -> Self {
        ReportLog::new(io::stdout(), "<stdout>")
    }
}

impl<W: Write> ReportLog<W> {
    /// `name` identifies the sink in error messages.
    pub fn new(out: W, name: impl Into<PathBuf>) -> Self {
        ReportLog { out, name: name.into() }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Write one line and flush it.
    pub fn line(&mut self, args: fmt::Arguments<'_>) -> Result<()> {
        self.out
            .write_fmt(args)
            .and_then(|_| self.out.write_all(b"\n"))
            .and_then(|_| self.out.flush())
            .map_err(|e| HarnessError::io(&self.name, e))
    }

    pub fn reading_graph(&mut self, path: &Path) -> Result<()> {
        self.line(format_args!("Reading graph from file: {}", path.display()))
    }

    pub fn graph_loaded(&mut self, path: &Path, stats: &GraphStats) -> Result<()> {
        self.line(format_args!("Read graph from file: {}", path.display()))?;
        self.line(format_args!("Nodes: {}, Edges: {}", stats.nodes, stats.edges))?;
        self.line(format_args!(
            "Directed: {}, Weighted: {}",
            stats.directed, stats.weighted
        ))
    }

    pub fn running(&mut self, algorithm: &str, family: AlgorithmFamily) -> Result<()> {
        self.line(format_args!("Running {} ({}) ...", algorithm, family))
    }

    /// Headline line for community detection and centrality runs.
    pub fn runtime(&mut self, algorithm: &str, headline: Duration, modularity: Option<f64>) -> Result<()> {
        match modularity {
            Some(q) => self.line(format_args!(
                "{}: Runtime: {:.3}ms, Modularity: {}",
                algorithm,
                as_millis_f64(headline),
                q
            )),
            None => self.line(format_args!("{}: Runtime: {:.3}ms", algorithm, as_millis_f64(headline))),
        }
    }

    pub fn phases(&mut self, invocation: &Invocation) -> Result<()> {
        let totals = invocation.phase_totals();
        if totals.is_empty() {
            return Ok(());
        }
        let body: Vec<String> = totals
            .iter()
            .map(|(name, d)| format!("{}={:.3}ms", name, as_millis_f64(*d)))
            .collect();
        self.line(format_args!("Phases: {}", body.join(", ")))
    }

    pub fn subsets(&mut self, count: usize) -> Result<()> {
        self.line(format_args!("Subsets: {}", count))
    }

    pub fn batch(&mut self, algorithm: &str, run: &BatchRun) -> Result<()> {
        self.line(format_args!("Batch fraction: {} [{} edges]", run.fraction, run.batch_size))?;
        self.line(format_args!(
            "{}: Runtime: {:.3}ms, Batch size: {}, Pairs: {}",
            algorithm,
            as_millis_f64(run.extract_time),
            run.batch_size,
            run.extracted
        ))
    }

    pub fn memory(&mut self, snapshot: &ResourceSnapshot) -> Result<()> {
        self.line(format_args!(
            "Memory [{}]: rss={}, peak={}",
            snapshot.label, snapshot.resident_bytes, snapshot.peak_resident_bytes
        ))
    }

    pub fn memory_unavailable(&mut self, reason: &str) -> Result<()> {
        self.line(format_args!("Memory: unavailable ({})", reason))
    }

    pub fn total_time(&mut self, wall: Duration) -> Result<()> {
        self.line(format_args!("Total time: {:.3}ms", as_millis_f64(wall)))
    }
}

/// Everything measured in one harness run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub graph: PathBuf,
    pub stats: GraphStats,
    pub algorithm: String,
    pub family: AlgorithmFamily,
    /// Headline runtime of the algorithm. For sweeps, the sum of extraction times.
    pub headline: Duration,
    /// Load, run and extraction, end to end.
    pub wall: Duration,
    pub modularity: Option<f64>,
    pub subsets: Option<usize>,
    pub snapshots: Vec<ResourceSnapshot>,
    pub batches: Vec<BatchRun>,
}

impl RunSummary {
    pub fn peak_resident_bytes(&self) -> Option<u64> {
        self.snapshots.iter().map(|s| s.peak_resident_bytes).max()
    }

    /// Closing line. Memory figures are logged as each checkpoint is taken.
    pub fn emit<W: Write>(&self, log: &mut ReportLog<W>) -> Result<()> {
        log.total_time(self.wall)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Counts flushes so the per-line flush is observable.
    #[derive(Default)]
    struct Counting {
        buf: Vec<u8>,
        flushes: usize,
    }

    impl Write for Counting {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.buf.extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            self.flushes += 1;
            Ok(())
        }
    }

    #[test]
    fn every_line_is_flushed() {
        let mut log = ReportLog::new(Counting::default(), "mem");
        let stats = GraphStats { nodes: 4, edges: 3, directed: false, weighted: false };
        log.graph_loaded(Path::new("/data/g.elist"), &stats).unwrap();
        log.runtime("PLP", Duration::from_micros(1500), Some(0.25)).unwrap();
        let out = log.into_inner();
        assert_eq!(out.flushes, 4);
        assert_eq!(
            String::from_utf8(out.buf).unwrap(),
            "Read graph from file: /data/g.elist\n\
             Nodes: 4, Edges: 3\n\
             Directed: false, Weighted: false\n\
             PLP: Runtime: 1.500ms, Modularity: 0.25\n"
        );
    }

    #[test]
    fn summary_emits_only_total_time() {
        let summary = RunSummary {
            graph: PathBuf::from("g.elist"),
            stats: GraphStats { nodes: 1, edges: 0, directed: false, weighted: false },
            algorithm: "PLP".into(),
            family: AlgorithmFamily::CommunityDetection,
            headline: Duration::ZERO,
            wall: Duration::from_millis(2),
            modularity: None,
            subsets: None,
            snapshots: vec![
                ResourceSnapshot { resident_bytes: 10, peak_resident_bytes: 20, label: "initial".into() },
                ResourceSnapshot { resident_bytes: 30, peak_resident_bytes: 40, label: "after-run".into() },
            ],
            batches: vec![],
        };
        let mut log = ReportLog::new(Vec::new(), "mem");
        summary.emit(&mut log).unwrap();
        let text = String::from_utf8(log.into_inner()).unwrap();
        assert_eq!(text, "Total time: 2.000ms\n");
        assert_eq!(summary.peak_resident_bytes(), Some(40));
    }

    #[test]
    fn write_failure_is_io_error() {
        let mut log = ReportLog::new(FailingWriter, "<stdout>");
        let err = log.subsets(3).unwrap_err();
        assert_eq!(err.stage(), "write");
    }
}
