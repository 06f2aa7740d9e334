//! JSON topology documents.
//!
//! This is the hand-off format at the edges of the pipeline: network loaders produce it,
//! and the mutated topology is written back in the same shape for power-flow and
//! visualization tools.
//!
//! ```json
//! { "buses": [0, 1, 2], "lines": [[0, 1], [1, 2]] }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{BusId, GridError, GridResult, Topology};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyDocument {
    /// Every bus, including ones without lines.
    #[serde(default)]
    pub buses: Vec<BusId>,
    pub lines: Vec<(BusId, BusId)>,
}

impl TopologyDocument {
    pub fn from_topology(topology: &Topology) -> Self {
        let mut buses: Vec<BusId> = topology.buses().collect();
        buses.sort_unstable();
        Self {
            buses,
            lines: topology.lines(),
        }
    }

    /// Validate and materialize the document. Line endpoints missing from `buses` are
    /// rejected, as are self loops and duplicate lines.
    pub fn into_topology(self) -> GridResult<Topology> {
        let mut topology = Topology::new();
        for bus in &self.buses {
            if !topology.add_bus(*bus) {
                return Err(GridError::Validation(format!("duplicate bus {bus}")));
            }
        }
        let implicit_buses = self.buses.is_empty();
        for (a, b) in self.lines {
            if implicit_buses {
                topology.add_bus(a);
                topology.add_bus(b);
            }
            if !topology.add_line(a, b)? {
                return Err(GridError::Validation(format!("duplicate line {a}-{b}")));
            }
        }
        Ok(topology)
    }
}

/// Read a topology document from disk.
///
/// An empty `buses` list means "the endpoints of `lines`".
pub fn load_topology(path: impl AsRef<Path>) -> GridResult<Topology> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let document: TopologyDocument = serde_json::from_str(&contents)?;
    let topology = document.into_topology()?;
    debug!(
        path = %path.display(),
        buses = topology.bus_count(),
        lines = topology.line_count(),
        "loaded topology"
    );
    Ok(topology)
}

/// Write a topology document to disk (pretty-printed JSON).
pub fn save_topology(path: impl AsRef<Path>, topology: &Topology) -> GridResult<()> {
    let payload = serde_json::to_string_pretty(&TopologyDocument::from_topology(topology))?;
    fs::write(path, payload)?;
    Ok(())
}
