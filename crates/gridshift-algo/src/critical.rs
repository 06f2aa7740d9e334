//! Critical bus detection.
//!
//! A bus is **critical** when removing it (with its lines) leaves the rest of the feeder
//! disconnected. Critical buses are never handed to the mutator: pulling one out would
//! island part of the network before reconnection even starts.
//!
//! Two detectors share the [`CriticalNodeDetector`] interface:
//!
//! | Detector | Method | Complexity |
//! |----------|--------|------------|
//! | [`RemovalDetector`] | Remove the bus, run a connectivity check | O(V·(V+E)) |
//! | [`ArticulationDetector`] | Tarjan low-link sweep | O(V+E) |
//!
//! The removal check is the reference definition. The articulation sweep gives identical
//! answers on every input, including topologies that are already split (where almost every
//! bus counts as critical because the reduced graph stays disconnected).

use std::collections::{BTreeMap, HashMap};

use gridshift_core::{count_islands, is_connected, BusId, Topology};

/// Critical flag per bus, valid only for the topology snapshot it was computed on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    flags: BTreeMap<BusId, bool>,
}

impl Classification {
    pub fn is_critical(&self, bus: BusId) -> Option<bool> {
        self.flags.get(&bus).copied()
    }

    /// Critical buses in ascending id order.
    pub fn critical(&self) -> Vec<BusId> {
        self.select(true)
    }

    /// Movable buses in ascending id order.
    pub fn non_critical(&self) -> Vec<BusId> {
        self.select(false)
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BusId, bool)> + '_ {
        self.flags.iter().map(|(bus, critical)| (*bus, *critical))
    }

    fn select(&self, critical: bool) -> Vec<BusId> {
        self.flags
            .iter()
            .filter(|(_, flag)| **flag == critical)
            .map(|(bus, _)| *bus)
            .collect()
    }
}

impl FromIterator<(BusId, bool)> for Classification {
    fn from_iter<T: IntoIterator<Item = (BusId, bool)>>(iter: T) -> Self {
        Self {
            flags: iter.into_iter().collect(),
        }
    }
}

/// Decides which buses cannot be removed without splitting the topology.
pub trait CriticalNodeDetector {
    /// Whether removing `bus` disconnects the remaining buses. Unknown buses are not critical.
    fn is_critical(&self, topology: &Topology, bus: BusId) -> bool;

    /// Classify every bus of the snapshot.
    fn classify(&self, topology: &Topology) -> Classification {
        topology
            .buses()
            .map(|bus| (bus, self.is_critical(topology, bus)))
            .collect()
    }
}

impl<D: CriticalNodeDetector + ?Sized> CriticalNodeDetector for &D {
    fn is_critical(&self, topology: &Topology, bus: BusId) -> bool {
        (**self).is_critical(topology, bus)
    }

    fn classify(&self, topology: &Topology) -> Classification {
        (**self).classify(topology)
    }
}

/// Remove-and-check detector: copies the topology without the bus and tests connectivity.
#[derive(Debug, Clone, Copy, Default)]
pub struct RemovalDetector;

impl CriticalNodeDetector for RemovalDetector {
    fn is_critical(&self, topology: &Topology, bus: BusId) -> bool {
        if !topology.contains_bus(bus) {
            return false;
        }
        !is_connected(&topology.without_bus(bus))
    }
}

/// Linear-time detector based on articulation points.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArticulationDetector;

impl CriticalNodeDetector for ArticulationDetector {
    fn is_critical(&self, topology: &Topology, bus: BusId) -> bool {
        self.classify(topology).is_critical(bus).unwrap_or(false)
    }

    fn classify(&self, topology: &Topology) -> Classification {
        let buses: Vec<BusId> = topology.buses().collect();
        match count_islands(topology) {
            0 | 1 => {
                let cut = articulation_points(topology, &buses);
                buses.iter().copied().zip(cut).collect()
            }
            // Removing a bus from one of two islands leaves the other island untouched, so
            // the rest is connected only if the bus was an island on its own.
            2 => buses
                .iter()
                .map(|bus| (*bus, topology.degree(*bus) > 0))
                .collect(),
            // At least two islands survive any single removal.
            _ => buses.iter().map(|bus| (*bus, true)).collect(),
        }
    }
}

/// Iterative Tarjan sweep. Returns one flag per entry of `buses`.
fn articulation_points(topology: &Topology, buses: &[BusId]) -> Vec<bool> {
    let n = buses.len();
    let index: HashMap<BusId, usize> = buses.iter().enumerate().map(|(i, b)| (*b, i)).collect();
    let adjacency: Vec<Vec<usize>> = buses
        .iter()
        .map(|bus| topology.neighbors(*bus).map(|nb| index[&nb]).collect())
        .collect();

    const UNVISITED: usize = usize::MAX;
    let mut disc = vec![UNVISITED; n];
    let mut low = vec![0; n];
    let mut parent = vec![UNVISITED; n];
    let mut cut = vec![false; n];
    let mut timer = 0;

    for root in 0..n {
        if disc[root] != UNVISITED {
            continue;
        }
        disc[root] = timer;
        low[root] = timer;
        timer += 1;
        let mut root_children = 0;
        // (vertex, next adjacency slot)
        let mut stack = vec![(root, 0usize)];

        while let Some(frame) = stack.last_mut() {
            let u = frame.0;
            if frame.1 < adjacency[u].len() {
                let v = adjacency[u][frame.1];
                frame.1 += 1;
                if disc[v] == UNVISITED {
                    parent[v] = u;
                    disc[v] = timer;
                    low[v] = timer;
                    timer += 1;
                    if u == root {
                        root_children += 1;
                    }
                    stack.push((v, 0));
                } else if v != parent[u] {
                    low[u] = low[u].min(disc[v]);
                }
            } else {
                stack.pop();
                if let Some(&(p, _)) = stack.last() {
                    low[p] = low[p].min(low[u]);
                    if p != root && low[u] >= disc[p] {
                        cut[p] = true;
                    }
                }
            }
        }

        if root_children > 1 {
            cut[root] = true;
        }
    }
    cut
}
