//! Graph ingestion.
//!
//! Parses the plain edge-list encoding used by the benchmark datasets:
//! - one edge per line, `src dst` or `src dst weight`, whitespace separated
//! - node ids are one-indexed unless the reader is told otherwise
//! - blank lines and lines starting with `#` or `%` are skipped
//!
//! The loaded graph is undirected and immutable; every stage borrows it.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use tracing::debug;

use crate::error::{HarnessError, Result};

/// Read-only metadata reported alongside a loaded graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphStats {
    pub nodes: usize,
    pub edges: usize,
    pub directed: bool,
    pub weighted: bool,
}

/// An immutable undirected graph with dense node ids `0..node_count`.
#[derive(Debug, Clone)]
pub struct Graph {
    inner: UnGraph<(), f64>,
    weighted: bool,
}

impl Graph {
    /// Build a graph from zero-indexed edges. Unweighted edges carry weight 1.
    pub fn from_edges(node_count: usize, edges: &[(u32, u32, f64)], weighted: bool) -> Self {
        let mut inner = UnGraph::with_capacity(node_count, edges.len());
        for _ in 0..node_count {
            inner.add_node(());
        }
        for &(u, v, w) in edges {
            inner.add_edge(NodeIndex::new(u as usize), NodeIndex::new(v as usize), w);
        }
        Graph { inner, weighted }
    }

    /// Unweighted graph from zero-indexed pairs.
    pub fn from_pairs(node_count: usize, pairs: &[(u32, u32)]) -> Self {
        let edges: Vec<_> = pairs.iter().map(|&(u, v)| (u, v, 1.0)).collect();
        Self::from_edges(node_count, &edges, false)
    }

    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    pub fn is_directed(&self) -> bool {
        false
    }

    pub fn is_weighted(&self) -> bool {
        self.weighted
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            nodes: self.node_count(),
            edges: self.edge_count(),
            directed: self.is_directed(),
            weighted: self.is_weighted(),
        }
    }

    /// Neighbours of `node` with edge weights. A self-loop yields `node` once.
    pub fn neighbors(&self, node: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let idx = NodeIndex::new(node);
        self.inner.edges(idx).map(move |e| {
            let other = if e.source() == idx { e.target() } else { e.source() };
            (other.index(), *e.weight())
        })
    }

    /// Every edge once, as `(u, v, weight)` in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.inner
            .edge_references()
            .map(|e| (e.source().index(), e.target().index(), *e.weight()))
    }

    /// Weighted degree; self-loops count twice.
    pub fn weighted_degree(&self, node: usize) -> f64 {
        let idx = NodeIndex::new(node);
        self.inner
            .edges(idx)
            .map(|e| if e.source() == e.target() { 2.0 * e.weight() } else { *e.weight() })
            .sum()
    }

    pub fn total_edge_weight(&self) -> f64 {
        self.inner.edge_references().map(|e| *e.weight()).sum()
    }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    let home = std::env::var_os("HOME");
    match (path.strip_prefix('~'), home) {
        (Some(""), Some(home)) => PathBuf::from(home),
        (Some(rest), Some(home)) if rest.starts_with('/') => {
            PathBuf::from(home).join(rest.trim_start_matches('/'))
        }
        _ => PathBuf::from(path),
    }
}

/// Dataset name of a graph file: the file name without `.mtx.elist`,
/// `.elist` or any other extension.
pub fn dataset_name(path: &Path) -> String {
    let file = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    for suffix in [".mtx.elist", ".elist"] {
        if let Some(stem) = file.strip_suffix(suffix) {
            return stem.to_string();
        }
    }
    match file.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => file.to_string(),
    }
}

/// Load a graph in the default one-indexed encoding.
pub fn load(path: &str) -> Result<Graph> {
    EdgeListReader::default().read(&expand_home(path))
}

/// Reader for whitespace separated edge lists.
#[derive(Debug, Clone)]
pub struct EdgeListReader {
    /// Smallest valid node id in the file (`1` for one-indexed input).
    pub first_node: u32,
}

impl Default for EdgeListReader {
    fn default() -> Self {
        EdgeListReader { first_node: 1 }
    }
}

impl EdgeListReader {
    pub fn zero_indexed() -> Self {
        EdgeListReader { first_node: 0 }
    }

    pub fn read(&self, path: &Path) -> Result<Graph> {
        let file = File::open(path).map_err(|e| HarnessError::load(path, e.to_string()))?;
        let reader = BufReader::new(file);

        let mut edges: Vec<(u32, u32, f64)> = Vec::new();
        let mut arity: Option<usize> = None;
        let mut max_id: Option<u32> = None;

        for (i, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| HarnessError::load(path, e.to_string()))?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('%') {
                continue;
            }
            let lineno = i + 1;
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() != 2 && parts.len() != 3 {
                return Err(HarnessError::load(
                    path,
                    format!("line {}: expected 2 or 3 fields, got {}", lineno, parts.len()),
                ));
            }
            match arity {
                None => arity = Some(parts.len()),
                Some(a) if a != parts.len() => {
                    return Err(HarnessError::load(
                        path,
                        format!("line {}: expected {} fields, got {}", lineno, a, parts.len()),
                    ));
                }
                _ => {}
            }

            let u = self.parse_id(path, lineno, parts[0])?;
            let v = self.parse_id(path, lineno, parts[1])?;
            let w = match parts.get(2) {
                Some(raw) => match raw.parse::<f64>() {
                    Ok(w) if w.is_finite() => w,
                    _ => {
                        return Err(HarnessError::load(
                            path,
                            format!("line {}: bad weight '{}'", lineno, raw),
                        ));
                    }
                },
                None => 1.0,
            };
            max_id = Some(max_id.map_or(u.max(v), |m| m.max(u).max(v)));
            edges.push((u, v, w));
        }

        let node_count = max_id.map_or(0, |m| m as usize + 1);
        let weighted = arity == Some(3);
        debug!(path = %path.display(), node_count, edges = edges.len(), weighted, "parsed edge list");
        Ok(Graph::from_edges(node_count, &edges, weighted))
    }

    fn parse_id(&self, path: &Path, lineno: usize, raw: &str) -> Result<u32> {
        let id = raw
            .parse::<u32>()
            .map_err(|e| HarnessError::load(path, format!("line {}: bad node id '{}': {}", lineno, raw, e)))?;
        let shifted = id.checked_sub(self.first_node).ok_or_else(|| {
            HarnessError::load(
                path,
                format!("line {}: node id {} below first id {}", lineno, id, self.first_node),
            )
        })?;
        // u32::MAX is petgraph's end-of-index sentinel
        if shifted == u32::MAX {
            return Err(HarnessError::load(
                path,
                format!("line {}: node id {} exceeds the largest supported id", lineno, id),
            ));
        }
        Ok(shifted)
    }
}
