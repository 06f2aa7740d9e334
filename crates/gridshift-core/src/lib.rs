//! # gridshift-core: Distribution Network Topology Core
//!
//! Provides the in-memory topology model that the mutation pipeline in `gridshift-algo`
//! operates on.
//!
//! ## Design Philosophy
//!
//! A feeder is modeled as an **undirected, unweighted simple graph** where:
//! - **Nodes**: Buses, identified by [`BusId`]
//! - **Edges**: Lines (or closed switches) between two distinct buses
//!
//! Electrical attributes (impedances, loads, ratings) stay with the external network model.
//! Connectivity questions only need the bus/line structure, so that is all this crate keeps.
//!
//! ## Quick Start
//!
//! ```rust
//! use gridshift_core::*;
//!
//! let mut topology = Topology::new();
//! topology.add_bus(BusId::new(0));
//! topology.add_bus(BusId::new(1));
//! topology.add_bus(BusId::new(2));
//! topology.add_line(BusId::new(0), BusId::new(1)).unwrap();
//! topology.add_line(BusId::new(1), BusId::new(2)).unwrap();
//!
//! assert!(is_connected(&topology));
//! assert_eq!(topology.degree(BusId::new(1)), 2);
//! ```
//!
//! ## Modules
//!
//! - [`graph_utils`] - Connectivity checks, island labelling, statistics, DOT export
//! - [`cases`] - Built-in reference feeders (IEEE 33-bus) and synthetic shapes
//! - [`io`] - JSON topology documents exchanged with loaders and power-flow tools
//! - [`error`] - Shared error type

use std::collections::BTreeSet;
use std::fmt;

use petgraph::graphmap::UnGraphMap;
use serde::{Deserialize, Serialize};

pub mod cases;
pub mod error;
pub mod graph_utils;
pub mod io;

pub use error::{GridError, GridResult};
pub use graph_utils::*;

/// Bus identifier. Opaque to the topology logic; only equality, ordering and hashing matter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct BusId(usize);

impl BusId {
    #[inline]
    pub fn new(value: usize) -> Self {
        BusId(value)
    }
    #[inline]
    pub fn value(&self) -> usize {
        self.0
    }
}

impl fmt::Display for BusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for BusId {
    fn from(value: usize) -> Self {
        BusId(value)
    }
}

/// Undirected bus/line topology of a distribution network.
///
/// Backed by a petgraph `UnGraphMap` so bus ids stay stable across removals. Lines are
/// unordered pairs of distinct buses; duplicates and self loops are rejected.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    graph: UnGraphMap<BusId, ()>,
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a topology from a line list. Endpoints are added as buses on the fly.
    pub fn from_lines<I>(lines: I) -> GridResult<Self>
    where
        I: IntoIterator<Item = (BusId, BusId)>,
    {
        let mut topology = Self::new();
        for (a, b) in lines {
            topology.add_bus(a);
            topology.add_bus(b);
            if !topology.add_line(a, b)? {
                return Err(GridError::Validation(format!("duplicate line {a}-{b}")));
            }
        }
        Ok(topology)
    }

    /// Insert a bus with no lines. Returns `false` if it was already present.
    pub fn add_bus(&mut self, bus: BusId) -> bool {
        if self.graph.contains_node(bus) {
            return false;
        }
        self.graph.add_node(bus);
        true
    }

    /// Remove a bus and every incident line, returning the buses it was connected to.
    ///
    /// Returns `None` if the bus is not part of the topology.
    pub fn remove_bus(&mut self, bus: BusId) -> Option<BTreeSet<BusId>> {
        if !self.graph.contains_node(bus) {
            return None;
        }
        let neighbors = self.neighbor_set(bus);
        self.graph.remove_node(bus);
        Some(neighbors)
    }

    /// Connect two existing buses. Returns `Ok(false)` if the line already exists.
    pub fn add_line(&mut self, a: BusId, b: BusId) -> GridResult<bool> {
        if a == b {
            return Err(GridError::Validation(format!("self loop on bus {a}")));
        }
        for bus in [a, b] {
            if !self.graph.contains_node(bus) {
                return Err(GridError::Network(format!("unknown bus {bus}")));
            }
        }
        if self.graph.contains_edge(a, b) {
            return Ok(false);
        }
        self.graph.add_edge(a, b, ());
        Ok(true)
    }

    /// Disconnect two buses. Returns `false` if no such line existed.
    pub fn remove_line(&mut self, a: BusId, b: BusId) -> bool {
        self.graph.remove_edge(a, b).is_some()
    }

    pub fn contains_bus(&self, bus: BusId) -> bool {
        self.graph.contains_node(bus)
    }

    pub fn contains_line(&self, a: BusId, b: BusId) -> bool {
        self.graph.contains_edge(a, b)
    }

    /// Adjacent buses. Empty for unknown buses.
    pub fn neighbors(&self, bus: BusId) -> impl Iterator<Item = BusId> + '_ {
        let known = self.graph.contains_node(bus);
        known
            .then(|| self.graph.neighbors(bus))
            .into_iter()
            .flatten()
    }

    pub fn neighbor_set(&self, bus: BusId) -> BTreeSet<BusId> {
        self.neighbors(bus).collect()
    }

    pub fn degree(&self, bus: BusId) -> usize {
        self.neighbors(bus).count()
    }

    /// Buses in insertion order.
    pub fn buses(&self) -> impl Iterator<Item = BusId> + '_ {
        self.graph.nodes()
    }

    /// Lines as `(low, high)` pairs, sorted.
    pub fn lines(&self) -> Vec<(BusId, BusId)> {
        let mut lines: Vec<_> = self
            .graph
            .all_edges()
            .map(|(a, b, _)| if a <= b { (a, b) } else { (b, a) })
            .collect();
        lines.sort_unstable();
        lines
    }

    pub fn bus_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn line_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Logical copy of the topology with `bus` and its lines removed.
    pub fn without_bus(&self, bus: BusId) -> Topology {
        let mut copy = self.clone();
        copy.remove_bus(bus);
        copy
    }

    /// Read-only access to the underlying petgraph map.
    pub fn graph(&self) -> &UnGraphMap<BusId, ()> {
        &self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b(id: usize) -> BusId {
        BusId::new(id)
    }

    #[test]
    fn add_and_remove_lines() {
        let mut topology = Topology::new();
        topology.add_bus(b(1));
        topology.add_bus(b(2));
        assert!(topology.add_line(b(1), b(2)).unwrap());
        assert!(!topology.add_line(b(2), b(1)).unwrap());
        assert_eq!(topology.line_count(), 1);
        assert!(topology.contains_line(b(2), b(1)));
        assert!(topology.remove_line(b(1), b(2)));
        assert!(!topology.remove_line(b(1), b(2)));
        assert_eq!(topology.bus_count(), 2);
    }

    #[test]
    fn rejects_self_loops_and_unknown_buses() {
        let mut topology = Topology::new();
        topology.add_bus(b(1));
        assert!(matches!(
            topology.add_line(b(1), b(1)),
            Err(GridError::Validation(_))
        ));
        assert!(matches!(
            topology.add_line(b(1), b(9)),
            Err(GridError::Network(_))
        ));
    }

    #[test]
    fn remove_bus_reports_former_neighbors() {
        let mut topology =
            Topology::from_lines([(b(0), b(1)), (b(1), b(2)), (b(1), b(3))]).unwrap();
        let neighbors = topology.remove_bus(b(1)).unwrap();
        assert_eq!(neighbors, BTreeSet::from([b(0), b(2), b(3)]));
        assert_eq!(topology.line_count(), 0);
        assert_eq!(topology.bus_count(), 3);
        assert!(topology.remove_bus(b(1)).is_none());
        assert_eq!(topology.degree(b(1)), 0);
    }

    #[test]
    fn from_lines_rejects_duplicates() {
        let err = Topology::from_lines([(b(0), b(1)), (b(1), b(0))]).unwrap_err();
        assert!(err.to_string().contains("duplicate line"));
    }

    #[test]
    fn lines_are_normalised_and_sorted() {
        let topology = Topology::from_lines([(b(3), b(2)), (b(1), b(0))]).unwrap();
        assert_eq!(topology.lines(), vec![(b(0), b(1)), (b(2), b(3))]);
    }

    #[test]
    fn without_bus_leaves_original_untouched() {
        let topology = Topology::from_lines([(b(0), b(1)), (b(1), b(2))]).unwrap();
        let reduced = topology.without_bus(b(1));
        assert_eq!(reduced.bus_count(), 2);
        assert_eq!(reduced.line_count(), 0);
        assert_eq!(topology.line_count(), 2);
    }
}
