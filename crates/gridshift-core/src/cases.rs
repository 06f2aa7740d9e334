//! Built-in topologies.
//!
//! [`case33bw`] is the Baran–Wu 33-bus radial distribution feeder (buses numbered from 0),
//! the usual starting point for topology resilience studies. The synthetic shapes are handy
//! for tests and quick experiments from the CLI.

use crate::{BusId, Topology};

/// In-service sections of the 33-bus feeder.
const CASE33BW_LINES: [(usize, usize); 32] = [
    // main feeder
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 4),
    (4, 5),
    (5, 6),
    (6, 7),
    (7, 8),
    (8, 9),
    (9, 10),
    (10, 11),
    (11, 12),
    (12, 13),
    (13, 14),
    (14, 15),
    (15, 16),
    (16, 17),
    // lateral from bus 1
    (1, 18),
    (18, 19),
    (19, 20),
    (20, 21),
    // lateral from bus 2
    (2, 22),
    (22, 23),
    (23, 24),
    // lateral from bus 5
    (5, 25),
    (25, 26),
    (26, 27),
    (27, 28),
    (28, 29),
    (29, 30),
    (30, 31),
    (31, 32),
];

/// Normally-open tie switches of the 33-bus feeder.
const CASE33BW_TIES: [(usize, usize); 5] = [(7, 20), (8, 14), (11, 21), (17, 32), (24, 28)];

/// Names accepted by [`builtin`].
pub const BUILTIN_NAMES: [&str; 2] = ["case33bw", "case33bw-meshed"];

/// Radial 33-bus feeder with all tie switches open.
pub fn case33bw() -> Topology {
    from_pairs(CASE33BW_LINES.iter().copied())
}

/// 33-bus feeder with the five tie switches closed.
pub fn case33bw_meshed() -> Topology {
    from_pairs(CASE33BW_LINES.iter().chain(CASE33BW_TIES.iter()).copied())
}

/// Look up a built-in case by name.
pub fn builtin(name: &str) -> Option<Topology> {
    match name.to_ascii_lowercase().as_str() {
        "case33bw" => Some(case33bw()),
        "case33bw-meshed" => Some(case33bw_meshed()),
        _ => None,
    }
}

/// `0 - 1 - ... - (n-1)`
pub fn path(n: usize) -> Topology {
    let mut topology = buses(n);
    for i in 1..n {
        link(&mut topology, i - 1, i);
    }
    topology
}

/// Path closed into a ring. Needs at least three buses to be a cycle.
pub fn cycle(n: usize) -> Topology {
    let mut topology = path(n);
    if n >= 3 {
        link(&mut topology, n - 1, 0);
    }
    topology
}

/// Bus 0 at the center, buses `1..=leaves` around it.
pub fn star(leaves: usize) -> Topology {
    let mut topology = buses(leaves + 1);
    for leaf in 1..=leaves {
        link(&mut topology, 0, leaf);
    }
    topology
}

/// Complete graph on `n` buses.
pub fn complete(n: usize) -> Topology {
    let mut topology = buses(n);
    for i in 0..n {
        for j in (i + 1)..n {
            link(&mut topology, i, j);
        }
    }
    topology
}

fn buses(n: usize) -> Topology {
    let mut topology = Topology::new();
    for i in 0..n {
        topology.add_bus(BusId::new(i));
    }
    topology
}

fn from_pairs(pairs: impl Iterator<Item = (usize, usize)>) -> Topology {
    let mut topology = Topology::new();
    for (a, b) in pairs {
        topology.add_bus(BusId::new(a));
        topology.add_bus(BusId::new(b));
        link(&mut topology, a, b);
    }
    topology
}

// Endpoints always exist and differ here, so the result can be ignored.
fn link(topology: &mut Topology, a: usize, b: usize) {
    let _ = topology.add_line(BusId::new(a), BusId::new(b));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::is_connected;

    #[test]
    fn case33bw_shape() {
        let topology = case33bw();
        assert_eq!(topology.bus_count(), 33);
        assert_eq!(topology.line_count(), 32);
        assert!(is_connected(&topology));
        let leaves: Vec<usize> = topology
            .buses()
            .filter(|bus| topology.degree(*bus) == 1)
            .map(|bus| bus.value())
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect();
        assert_eq!(leaves, vec![0, 17, 21, 24, 32]);
    }

    #[test]
    fn builtin_lookup() {
        assert_eq!(builtin("CASE33BW").unwrap().line_count(), 32);
        assert_eq!(builtin("case33bw-meshed").unwrap().line_count(), 37);
        assert!(builtin("case118").is_none());
    }

    #[test]
    fn synthetic_shapes() {
        assert_eq!(path(4).line_count(), 3);
        assert_eq!(cycle(6).line_count(), 6);
        assert_eq!(star(4).degree(BusId::new(0)), 4);
        assert_eq!(complete(5).line_count(), 10);
        assert_eq!(cycle(2).line_count(), 1);
    }
}
