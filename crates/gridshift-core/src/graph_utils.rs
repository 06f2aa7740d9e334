use crate::{BusId, GridError, GridResult, Topology};
use petgraph::algo::connected_components;
use std::collections::{BTreeSet, HashSet, VecDeque};

/// Summary statistics produced by `graph stats`.
#[derive(Debug)]
pub struct GraphStats {
    pub bus_count: usize,
    pub line_count: usize,
    pub islands: usize,
    pub min_degree: usize,
    pub avg_degree: f64,
    pub max_degree: usize,
    pub density: f64,
    /// Buses with a single line; on a radial feeder these are the lateral ends.
    pub leaves: usize,
    /// Connected with exactly `n - 1` lines (a spanning tree).
    pub radial: bool,
}

/// One connected component, members sorted by id.
#[derive(Debug)]
pub struct Island {
    pub island_id: usize,
    pub buses: Vec<BusId>,
}

/// Islands in order of their smallest bus, plus a bus-to-island lookup.
#[derive(Debug)]
pub struct IslandAnalysis {
    pub islands: Vec<Island>,
    pub assignments: Vec<(BusId, usize)>,
}

/// Whether every bus can reach every other bus.
///
/// Breadth-first search from an arbitrary bus, O(V+E). Empty and single-bus topologies are
/// connected by convention.
pub fn is_connected(topology: &Topology) -> bool {
    let Some(start) = topology.buses().next() else {
        return true;
    };
    reachable_from(topology, start).len() == topology.bus_count()
}

/// Number of connected components (zero for an empty topology).
pub fn count_islands(topology: &Topology) -> usize {
    connected_components(topology.graph())
}

fn reachable_from(topology: &Topology, start: BusId) -> HashSet<BusId> {
    let mut visited = HashSet::with_capacity(topology.bus_count());
    let mut queue = VecDeque::new();
    visited.insert(start);
    queue.push_back(start);
    while let Some(bus) = queue.pop_front() {
        for neighbor in topology.neighbors(bus) {
            if visited.insert(neighbor) {
                queue.push_back(neighbor);
            }
        }
    }
    visited
}

pub fn graph_stats(topology: &Topology) -> GraphStats {
    let bus_count = topology.bus_count();
    let line_count = topology.line_count();
    let degrees: Vec<usize> = topology.buses().map(|bus| topology.degree(bus)).collect();
    let min_degree = degrees.iter().copied().min().unwrap_or(0);
    let max_degree = degrees.iter().copied().max().unwrap_or(0);
    let avg_degree = if bus_count == 0 {
        0.0
    } else {
        degrees.iter().sum::<usize>() as f64 / bus_count as f64
    };
    let density = if bus_count < 2 {
        0.0
    } else {
        2.0 * line_count as f64 / (bus_count as f64 * (bus_count as f64 - 1.0))
    };
    let islands = count_islands(topology);
    GraphStats {
        bus_count,
        line_count,
        islands,
        min_degree,
        avg_degree,
        max_degree,
        density,
        leaves: degrees.iter().filter(|&&degree| degree == 1).count(),
        radial: islands == 1 && line_count + 1 == bus_count,
    }
}

/// Splits the topology into islands, numbered by their smallest bus.
pub fn find_islands(topology: &Topology) -> IslandAnalysis {
    let mut buses: Vec<BusId> = topology.buses().collect();
    buses.sort_unstable();
    let mut visited = HashSet::new();
    let mut islands = Vec::new();
    for start in buses {
        if visited.contains(&start) {
            continue;
        }
        let mut members: Vec<BusId> = reachable_from(topology, start).into_iter().collect();
        members.sort_unstable();
        visited.extend(members.iter().copied());
        islands.push(Island {
            island_id: islands.len(),
            buses: members,
        });
    }
    let mut assignments: Vec<(BusId, usize)> = islands
        .iter()
        .flat_map(|island| island.buses.iter().map(move |&bus| (bus, island.island_id)))
        .collect();
    assignments.sort_unstable();
    IslandAnalysis {
        islands,
        assignments,
    }
}

/// Render the topology as Graphviz DOT.
///
/// Buses in `relocated` are filled and their lines drawn bold, so the result of a mutation
/// pass stands out against the untouched feeder.
pub fn export_graph(
    topology: &Topology,
    format: &str,
    relocated: &BTreeSet<BusId>,
) -> GridResult<String> {
    match format.to_ascii_lowercase().as_str() {
        "graphviz" | "dot" => Ok(render_dot(topology, relocated)),
        other => Err(GridError::Validation(format!(
            "unsupported graph export format '{other}'"
        ))),
    }
}

fn render_dot(topology: &Topology, relocated: &BTreeSet<BusId>) -> String {
    let mut buses: Vec<BusId> = topology.buses().collect();
    buses.sort_unstable();
    let mut buffer = String::from("graph gridshift_topology {\n  node [shape=circle];\n");
    for bus in buses {
        if relocated.contains(&bus) {
            buffer.push_str(&format!(
                "  b{bus} [label=\"{bus}\", style=filled, fillcolor=orange];\n"
            ));
        } else {
            buffer.push_str(&format!("  b{bus} [label=\"{bus}\"];\n"));
        }
    }
    for (a, b) in topology.lines() {
        if relocated.contains(&a) || relocated.contains(&b) {
            buffer.push_str(&format!("  b{a} -- b{b} [penwidth=2];\n"));
        } else {
            buffer.push_str(&format!("  b{a} -- b{b};\n"));
        }
    }
    buffer.push('}');
    buffer
}
