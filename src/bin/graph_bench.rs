//! Graph algorithm benchmark.
//!
//! Usage: `graph-bench <graph> [<output>] [--algorithm plp|louvain|leiden|pagerank|jaccard]`
//!
//! The report goes to stdout; diagnostics go to stderr and follow `RUST_LOG`.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use graph_harness::config::{Cli, HarnessConfig};
use graph_harness::harness;
use graph_harness::probe::ResourceProbe;
use graph_harness::recorder::ResultRecorder;
use graph_harness::report::ReportLog;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let config = match HarnessConfig::from_cli(Cli::parse()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: config: {}", e);
            std::process::exit(1);
        }
    };

    let mut log = ReportLog::stdout();
    let summary = match harness::run(&config, &mut log, &ResourceProbe::new()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {}: {}", e.stage(), e);
            std::process::exit(1);
        }
    };

    if let Some(path) = &config.json_report {
        let mut recorder = ResultRecorder::new();
        recorder.record_summary(&summary);
        if let Err(e) = recorder.save(path) {
            eprintln!("error: {}: {}", e.stage(), e);
            std::process::exit(1);
        }
        eprintln!("Results saved to {}", path.display());
    }
}
