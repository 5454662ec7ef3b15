//! Partition dump files.
//!
//! One line per node in ascending id order, `<node> <community>\n`, no
//! header. Line `i` always describes node `i`. A failed write may leave a
//! truncated file behind; it is not cleaned up.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::algorithm::Partition;
use crate::error::{HarnessError, Result};

/// Write `partition` to `path`, replacing any existing file.
pub fn write_partition(path: &Path, partition: &Partition) -> Result<()> {
    let missing = partition.missing(partition.len());
    if missing > 0 {
        return Err(HarnessError::PartitionCoverage {
            missing,
            node_count: partition.len(),
        });
    }
    let file = File::create(path).map_err(|e| HarnessError::io(path, e))?;
    let mut out = BufWriter::new(file);
    write_partition_to(&mut out, partition)
        .and_then(|_| out.flush())
        .map_err(|e| HarnessError::io(path, e))
}

/// Serialize to any writer. Unassigned nodes are skipped.
pub fn write_partition_to<W: Write>(out: &mut W, partition: &Partition) -> io::Result<()> {
    for (node, community) in partition.iter() {
        if let Some(c) = community {
            writeln!(out, "{} {}", node, c)?;
        }
    }
    Ok(())
}

/// Parse a partition dump. Lines may appear in any order.
pub fn read_partition(path: &Path) -> Result<Partition> {
    let file = File::open(path).map_err(|e| HarnessError::io(path, e))?;
    let mut partition = Partition::default();
    for (i, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| HarnessError::io(path, e))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let bad = || {
            HarnessError::io(
                path,
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("line {}: expected '<node> <community>', got '{}'", i + 1, line),
                ),
            )
        };
        let mut parts = line.split_whitespace();
        let node: usize = parts.next().and_then(|s| s.parse().ok()).ok_or_else(bad)?;
        let community: u64 = parts.next().and_then(|s| s.parse().ok()).ok_or_else(bad)?;
        if parts.next().is_some() {
            return Err(bad());
        }
        partition.set(node, community);
    }
    Ok(partition)
}
