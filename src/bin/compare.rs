//! Run report comparison tool.
//!
//! Compares two JSON run reports and prints runtime deltas per benchmark,
//! plus the modularity change for community-detection runs.
//!
//! Usage: `cargo run --bin bench-compare -- <baseline.json> <candidate.json>`

use std::collections::HashMap;
use std::path::Path;

use graph_harness::recorder::load_report;
use graph_harness::schema::{RunMetrics, RunRecord, RunReport};

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <baseline.json> <candidate.json>", args[0]);
        std::process::exit(1);
    }

    let baseline = read(&args[1]);
    let candidate = read(&args[2]);

    let base_map: HashMap<&str, &RunRecord> = baseline
        .results
        .iter()
        .map(|r| (r.benchmark.as_str(), r))
        .collect();

    eprintln!("Baseline: {} ({})", args[1], baseline.metadata.timestamp);
    eprintln!("Candidate: {} ({})", args[2], candidate.metadata.timestamp);
    eprintln!();

    println!(
        "{:<48} | {:>12} | {:>12} | {:>18} | {:>10}",
        "Benchmark", "Base", "New", "Delta", "dQ"
    );
    println!("{}", "-".repeat(110));

    let mut matched = 0u32;
    let mut only_cand = 0u32;
    for cand in &candidate.results {
        match base_map.get(cand.benchmark.as_str()) {
            Some(base) => {
                matched += 1;
                print_comparison(&cand.benchmark, &base.metrics, &cand.metrics);
            }
            None => only_cand += 1,
        }
    }

    let cand_names: Vec<&str> = candidate.results.iter().map(|r| r.benchmark.as_str()).collect();
    let only_base = baseline
        .results
        .iter()
        .filter(|r| !cand_names.contains(&r.benchmark.as_str()))
        .count();

    println!("{}", "-".repeat(110));
    println!(
        "Compared: {} | Baseline only: {} | Candidate only: {}",
        matched, only_base, only_cand
    );
}

fn read(path: &str) -> RunReport {
    load_report(Path::new(path)).unwrap_or_else(|e| {
        eprintln!("error: {}", e);
        std::process::exit(1);
    })
}

fn print_comparison(name: &str, base: &RunMetrics, cand: &RunMetrics) {
    let delta_pct = if base.runtime_ms > 0.0 {
        (cand.runtime_ms - base.runtime_ms) / base.runtime_ms * 100.0
    } else {
        0.0
    };
    let hint = if delta_pct < -1.0 {
        "faster"
    } else if delta_pct > 1.0 {
        "slower"
    } else {
        "~same"
    };
    let dq = match (base.modularity, cand.modularity) {
        (Some(b), Some(c)) => format!("{:+.4}", c - b),
        _ => "-".to_string(),
    };

    println!(
        "{:<48} | {:>12} | {:>12} | {:>+9.1}% ({:>6}) | {:>10}",
        name,
        format_ms(base.runtime_ms),
        format_ms(cand.runtime_ms),
        delta_pct,
        hint,
        dq,
    );
}

fn format_ms(ms: f64) -> String {
    if ms < 1.0 {
        format!("{:.1} us", ms * 1_000.0)
    } else if ms < 1_000.0 {
        format!("{:.2} ms", ms)
    } else {
        format!("{:.2} s", ms / 1_000.0)
    }
}
