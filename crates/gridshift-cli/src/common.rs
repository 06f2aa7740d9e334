//! Helpers shared across commands.

use std::path::Path;

use anyhow::{Context, Result};
use gridshift_algo::{ArticulationDetector, CriticalNodeDetector, RemovalDetector};
use gridshift_core::{cases, io::load_topology, BusId, Topology};

use crate::cli::DetectorKind;

/// Load a topology from a builtin case name or a JSON document path.
///
/// Builtin names win over files of the same name in the working directory.
pub fn load_grid(grid: &str) -> Result<Topology> {
    if let Some(topology) = cases::builtin(grid) {
        return Ok(topology);
    }
    let path = Path::new(grid);
    if !path.exists() {
        anyhow::bail!(
            "'{grid}' is neither a topology file nor a builtin case ({})",
            cases::BUILTIN_NAMES.join(", ")
        );
    }
    load_topology(path).with_context(|| format!("loading topology from {grid}"))
}

pub fn detector(kind: DetectorKind) -> Box<dyn CriticalNodeDetector> {
    match kind {
        DetectorKind::Articulation => Box::new(ArticulationDetector),
        DetectorKind::Removal => Box::new(RemovalDetector),
    }
}

/// Compact bus listing: sorted ids with consecutive runs collapsed, e.g. `0-17,21`.
pub fn bus_ranges(buses: &[BusId]) -> String {
    let mut sorted = buses.to_vec();
    sorted.sort_unstable();
    let mut parts = Vec::new();
    let mut iter = sorted.iter().map(|bus| bus.value()).peekable();
    while let Some(start) = iter.next() {
        let mut end = start;
        while iter.peek() == Some(&(end + 1)) {
            end += 1;
            iter.next();
        }
        if start == end {
            parts.push(start.to_string());
        } else {
            parts.push(format!("{start}-{end}"));
        }
    }
    parts.join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_names_resolve() {
        assert_eq!(load_grid("case33bw").unwrap().bus_count(), 33);
    }

    #[test]
    fn missing_file_mentions_builtins() {
        let err = load_grid("does/not/exist.json").unwrap_err();
        assert!(err.to_string().contains("case33bw"));
    }

    #[test]
    fn bus_ranges_collapse_runs() {
        let buses: Vec<BusId> = [21, 0, 1, 2, 3, 9, 10].into_iter().map(BusId::new).collect();
        assert_eq!(bus_ranges(&buses), "0-3,9-10,21");
        assert_eq!(bus_ranges(&[]), "");
    }
}
