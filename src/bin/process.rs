//! Converts `graph-bench` console logs into CSV.
//!
//! Usage: `bench-process <csv|csv-dir> <log> <out>`
//!
//! `csv` writes every row to `out`; `csv-dir` (or any `out` without an
//! extension) writes `<graph>.csv` per graph into the directory `out`.

use std::path::Path;

use tracing_subscriber::EnvFilter;

use graph_harness::logparse::{self, ExportMode};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 4 {
        eprintln!("Usage: {} <csv|csv-dir> <log> <out>", args[0]);
        std::process::exit(1);
    }

    let mode: ExportMode = args[1].parse().unwrap_or_else(|e| {
        eprintln!("error: {}", e);
        std::process::exit(1);
    });

    let data = logparse::read_log(Path::new(&args[2])).unwrap_or_else(|e| {
        eprintln!("error: read: {}", e);
        std::process::exit(1);
    });
    if data.is_empty() {
        eprintln!("error: no results found in {}", args[2]);
        std::process::exit(1);
    }

    match logparse::export(mode, &data, Path::new(&args[3])) {
        Ok(files) => {
            for f in files {
                eprintln!("wrote {}", f.display());
            }
        }
        Err(e) => {
            eprintln!("error: {}: {}", e.stage(), e);
            std::process::exit(1);
        }
    }
}
