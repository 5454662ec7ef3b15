//! Turns harness console logs back into tabular rows.
//!
//! Only the lines needed for a row are looked at: the graph path, the
//! `Nodes/Edges` line, each community-detection headline and the closing
//! `Total time` line. A leading `YYYY-MM-DD HH:MM:SS` stamp (as added by
//! `ts` or similar) is ignored. Everything else is skipped.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::{debug, warn};

use crate::error::{HarnessError, Result};
use crate::graph::dataset_name;

/// One community-detection result.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRow {
    pub graph: String,
    pub order: usize,
    pub size: usize,
    pub modularity: f64,
    /// Headline runtime in milliseconds.
    pub clustering_time: f64,
    /// End-to-end time in milliseconds. Equals `clustering_time` until a
    /// `Total time` line follows the result.
    pub total_time: f64,
}

impl LogRow {
    pub const COLUMNS: [&'static str; 6] =
        ["graph", "order", "size", "modularity", "clustering_time", "total_time"];

    fn cells(&self) -> [String; 6] {
        [
            self.graph.clone(),
            self.order.to_string(),
            self.size.to_string(),
            self.modularity.to_string(),
            self.clustering_time.to_string(),
            self.total_time.to_string(),
        ]
    }
}

/// Rows grouped by graph, in the order graphs first appear in the log.
#[derive(Debug, Clone, Default)]
pub struct LogData {
    graphs: Vec<(String, Vec<LogRow>)>,
}

impl LogData {
    pub fn graphs(&self) -> impl Iterator<Item = (&str, &[LogRow])> {
        self.graphs.iter().map(|(g, rows)| (g.as_str(), rows.as_slice()))
    }

    /// All rows, graph by graph.
    pub fn rows(&self) -> impl Iterator<Item = &LogRow> {
        self.graphs.iter().flat_map(|(_, rows)| rows.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.rows().next().is_none()
    }

    fn rows_mut(&mut self, graph: &str) -> &mut Vec<LogRow> {
        let pos = match self.graphs.iter().position(|(g, _)| g == graph) {
            Some(pos) => pos,
            None => {
                self.graphs.push((graph.to_string(), Vec::new()));
                self.graphs.len() - 1
            }
        };
        &mut self.graphs[pos].1
    }
}

#[derive(Debug, Default)]
struct ParseState {
    graph: Option<String>,
    order: usize,
    size: usize,
    /// Whether the newest row of `graph` may still take a `Total time`.
    open_row: bool,
}

/// Parse a whole log.
pub fn parse_log(text: &str) -> LogData {
    let mut data = LogData::default();
    let mut state = ParseState::default();
    for line in text.lines() {
        parse_line(strip_timestamp(line.trim_end()), &mut data, &mut state);
    }
    data
}

/// Read and parse a log file.
pub fn read_log(path: &Path) -> Result<LogData> {
    let text = fs::read_to_string(path).map_err(|e| HarnessError::io(path, e))?;
    Ok(parse_log(&text))
}

fn parse_line(line: &str, data: &mut LogData, state: &mut ParseState) {
    if let Some(path) = line.strip_prefix("Reading graph from file:") {
        let graph = dataset_name(Path::new(path.trim()));
        data.rows_mut(&graph);
        state.graph = Some(graph);
        state.open_row = false;
    } else if let Some((order, size)) = parse_order(line) {
        state.order = order;
        state.size = size;
    } else if let Some((runtime, modularity)) = parse_result(line) {
        let Some(graph) = state.graph.clone() else {
            warn!(line, "result before any graph line, skipped");
            return;
        };
        data.rows_mut(&graph).push(LogRow {
            graph,
            order: state.order,
            size: state.size,
            modularity,
            clustering_time: runtime,
            total_time: runtime,
        });
        state.open_row = true;
    } else if let Some(total) = line.strip_prefix("Total time:").and_then(parse_millis) {
        if !state.open_row {
            return;
        }
        if let Some(graph) = state.graph.as_deref() {
            if let Some(row) = data.rows_mut(graph).last_mut() {
                row.total_time = total;
            }
        }
        state.open_row = false;
    } else {
        debug!(line, "ignored");
    }
}

fn parse_order(line: &str) -> Option<(usize, usize)> {
    let rest = line.strip_prefix("Nodes: ")?;
    let (nodes, edges) = rest.split_once(", Edges: ")?;
    Some((nodes.trim().parse().ok()?, edges.trim().parse().ok()?))
}

/// `<ALG>: Runtime: <ms>ms, Modularity: <q>`.
fn parse_result(line: &str) -> Option<(f64, f64)> {
    let (_, rest) = line.split_once(": Runtime: ")?;
    let (runtime, modularity) = rest.split_once("ms, Modularity: ")?;
    Some((runtime.trim().parse().ok()?, modularity.trim().parse().ok()?))
}

/// `<ms>ms`, or bare seconds as printed by older runs.
fn parse_millis(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    match raw.strip_suffix("ms") {
        Some(ms) => ms.trim().parse().ok(),
        None => raw.parse::<f64>().ok().map(|s| s * 1000.0),
    }
}

fn strip_timestamp(line: &str) -> &str {
    let mut parts = line.splitn(3, char::is_whitespace);
    let (Some(date), Some(time), Some(rest)) = (parts.next(), parts.next(), parts.next()) else {
        return line;
    };
    if is_stamp(date, '-') && is_stamp(time, ':') {
        rest.trim_start()
    } else {
        line
    }
}

/// Three runs of digits joined by `sep`.
fn is_stamp(s: &str, sep: char) -> bool {
    let fields: Vec<&str> = s.split(sep).collect();
    fields.len() == 3
        && fields
            .iter()
            .all(|f| !f.is_empty() && f.bytes().all(|b| b.is_ascii_digit()))
}

/// Write rows as CSV with a header line and every cell quoted.
pub fn write_csv<'a, W: Write>(out: &mut W, rows: impl IntoIterator<Item = &'a LogRow>) -> io::Result<()> {
    writeln!(out, "{}", LogRow::COLUMNS.join(","))?;
    for row in rows {
        let cells: Vec<String> = row
            .cells()
            .iter()
            .map(|c| format!("\"{}\"", c.replace('"', "\"\"")))
            .collect();
        writeln!(out, "{}", cells.join(","))?;
    }
    Ok(())
}

/// Output layout for [`export`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportMode {
    /// Every row in one file.
    Csv,
    /// One `<graph>.csv` per graph inside a directory.
    CsvDir,
}

impl FromStr for ExportMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "csv" => Ok(ExportMode::Csv),
            "csv-dir" => Ok(ExportMode::CsvDir),
            other => Err(format!("unknown mode \"{}\" (expected csv or csv-dir)", other)),
        }
    }
}

impl fmt::Display for ExportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportMode::Csv => write!(f, "csv"),
            ExportMode::CsvDir => write!(f, "csv-dir"),
        }
    }
}

fn write_csv_file<'a>(path: &Path, rows: impl IntoIterator<Item = &'a LogRow>) -> Result<()> {
    let file = fs::File::create(path).map_err(|e| HarnessError::io(path, e))?;
    let mut out = io::BufWriter::new(file);
    write_csv(&mut out, rows)
        .and_then(|_| out.flush())
        .map_err(|e| HarnessError::io(path, e))
}

/// Write `data` to `out` and return the files created. An `out` without an
/// extension always gets the per-graph layout.
pub fn export(mode: ExportMode, data: &LogData, out: &Path) -> Result<Vec<PathBuf>> {
    let mode = if out.extension().is_none() { ExportMode::CsvDir } else { mode };
    match mode {
        ExportMode::Csv => {
            write_csv_file(out, data.rows())?;
            Ok(vec![out.to_path_buf()])
        }
        ExportMode::CsvDir => {
            fs::create_dir_all(out).map_err(|e| HarnessError::io(out, e))?;
            let mut written = Vec::new();
            for (graph, rows) in data.graphs().filter(|(_, rows)| !rows.is_empty()) {
                let path = out.join(format!("{}.csv", graph));
                write_csv_file(&path, rows)?;
                written.push(path);
            }
            Ok(written)
        }
    }
}
