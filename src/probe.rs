//! Process memory snapshots.
//!
//! On Linux the resident and peak resident set sizes come from the `VmRSS`
//! and `VmHWM` lines of `/proc/self/status`. Elsewhere the probe reports
//! [`HarnessError::ResourceProbeUnavailable`] and the harness carries on
//! without memory figures.

use std::path::{Path, PathBuf};

use crate::error::{HarnessError, Result};

const PROC_STATUS: &str = "/proc/self/status";

/// Labels of the checkpoints a run takes, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkpoint {
    Initial,
    AfterLoad,
    AfterRun,
    AfterResultExtraction,
}

impl Checkpoint {
    pub const ALL: [Checkpoint; 4] = [
        Checkpoint::Initial,
        Checkpoint::AfterLoad,
        Checkpoint::AfterRun,
        Checkpoint::AfterResultExtraction,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Checkpoint::Initial => "initial",
            Checkpoint::AfterLoad => "after-load",
            Checkpoint::AfterRun => "after-run",
            Checkpoint::AfterResultExtraction => "after-result-extraction",
        }
    }
}

/// Memory state at one checkpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSnapshot {
    pub resident_bytes: u64,
    pub peak_resident_bytes: u64,
    pub label: String,
}

/// Reads memory figures for the current process.
#[derive(Debug, Clone)]
pub struct ResourceProbe {
    source: Option<PathBuf>,
}

impl Default for ResourceProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceProbe {
    /// Probe backed by procfs when the platform has it.
    pub fn new() -> Self {
        let source = if cfg!(target_os = "linux") {
            Some(PathBuf::from(PROC_STATUS))
        } else {
            None
        };
        ResourceProbe { source }
    }

    /// Probe reading a status file in procfs layout from `path`.
    pub fn from_status_file(path: impl Into<PathBuf>) -> Self {
        ResourceProbe { source: Some(path.into()) }
    }

    /// Probe that always reports unavailability.
    pub fn unavailable() -> Self {
        ResourceProbe { source: None }
    }

    pub fn snapshot(&self, label: &str) -> Result<ResourceSnapshot> {
        let path = self.source.as_deref().ok_or_else(|| {
            HarnessError::ResourceProbeUnavailable(format!(
                "no memory statistics on {}",
                std::env::consts::OS
            ))
        })?;
        let content = std::fs::read_to_string(path).map_err(|e| {
            HarnessError::ResourceProbeUnavailable(format!("failed to read {}: {}", path.display(), e))
        })?;
        parse_status(path, &content, label)
    }

    pub fn checkpoint(&self, checkpoint: Checkpoint) -> Result<ResourceSnapshot> {
        self.snapshot(checkpoint.label())
    }
}

fn parse_status(path: &Path, content: &str, label: &str) -> Result<ResourceSnapshot> {
    let mut rss = None;
    let mut hwm = None;
    for line in content.lines() {
        if let Some(rest) = line.strip_prefix("VmRSS:") {
            rss = parse_kib(rest);
        } else if let Some(rest) = line.strip_prefix("VmHWM:") {
            hwm = parse_kib(rest);
        }
    }
    match (rss, hwm) {
        (Some(rss), Some(hwm)) => Ok(ResourceSnapshot {
            resident_bytes: rss,
            peak_resident_bytes: hwm.max(rss),
            label: label.to_string(),
        }),
        _ => Err(HarnessError::ResourceProbeUnavailable(format!(
            "no VmRSS/VmHWM in {}",
            path.display()
        ))),
    }
}

// "   1234 kB" -> bytes
fn parse_kib(field: &str) -> Option<u64> {
    let mut parts = field.split_whitespace();
    let value: u64 = parts.next()?.parse().ok()?;
    match parts.next() {
        Some("kB") | None => value.checked_mul(1024),
        _ => None,
    }
}
