//! Benchmark harness for graph analytics algorithms.
//!
//! A run loads an edge-list graph, invokes one algorithm on it under a
//! stopwatch, evaluates the result and writes a line-oriented report:
//!
//! - community detection (PLP, Louvain, Leiden): modularity, subset count and
//!   an optional partition dump
//! - centrality (PageRank): runtime only
//! - link prediction (Jaccard index): a sweep over batch fractions
//!   `1e-7 .. 1e-1` timing top-k extraction
//!
//! Optional memory checkpoints and a JSON run report complement the console
//! output. See [`harness::run`] for the pipeline.

pub mod algorithm;
pub mod config;
pub mod error;
pub mod graph;
pub mod harness;
pub mod logparse;
pub mod output;
pub mod probe;
pub mod quality;
pub mod recorder;
pub mod report;
pub mod runner;
pub mod schema;
pub mod sweep;
pub mod timing;

pub use error::{HarnessError, Result};
