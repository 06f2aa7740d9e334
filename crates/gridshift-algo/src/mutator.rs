//! Connectivity-preserving bus relocation.
//!
//! Each bus goes through a small state machine:
//!
//! ```text
//! Active -> Removed -> Reconnecting(1..=max_attempts) -> Committed
//!                                                     \-> RolledBack
//! ```
//!
//! 1. **Active → Removed**: remember the current neighbours, drop the bus and its lines.
//! 2. **Removed → Reconnecting**: put the bus back with no lines.
//! 3. **Reconnecting**: shuffle every other bus, then connect to the first candidates one
//!    at a time, checking connectivity after each line. The first connected state commits.
//!    If none of the candidates of an attempt helps, their lines are removed again and the
//!    next attempt reshuffles.
//! 4. **RolledBack**: all attempts failed; the original lines are restored.
//!
//! Buses are processed in order and each commit is final for the rest of the batch, unless
//! the [`FailurePolicy`] says to revert the batch after a failure.

use std::collections::BTreeSet;

use gridshift_core::{count_islands, is_connected, BusId, Topology};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{FailurePolicy, MutationConfig};
use crate::critical::CriticalNodeDetector;
use crate::error::{MutationError, MutationResult};
use crate::sampler::sample_non_critical;

/// Why a bus ended up with its original lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RollbackReason {
    /// No attempt produced a connected topology.
    AttemptsExhausted { attempts: usize },
    /// The bus had committed, but a later failure reverted the whole batch.
    BatchReverted,
}

/// Result of relocating one bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NodeOutcome {
    Committed {
        bus: BusId,
        previous_neighbors: BTreeSet<BusId>,
        new_neighbors: BTreeSet<BusId>,
        attempts: usize,
    },
    RolledBack {
        bus: BusId,
        original_neighbors: BTreeSet<BusId>,
        reason: RollbackReason,
    },
}

impl NodeOutcome {
    pub fn bus(&self) -> BusId {
        match self {
            NodeOutcome::Committed { bus, .. } | NodeOutcome::RolledBack { bus, .. } => *bus,
        }
    }

    pub fn is_committed(&self) -> bool {
        matches!(self, NodeOutcome::Committed { .. })
    }

    pub fn is_rolled_back(&self) -> bool {
        matches!(self, NodeOutcome::RolledBack { .. })
    }

    /// Lines the bus has once this outcome is applied.
    pub fn neighbors(&self) -> &BTreeSet<BusId> {
        match self {
            NodeOutcome::Committed { new_neighbors, .. } => new_neighbors,
            NodeOutcome::RolledBack {
                original_neighbors, ..
            } => original_neighbors,
        }
    }
}

/// Per-bus outcomes of a batch, in processing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub policy: FailurePolicy,
    pub outcomes: Vec<NodeOutcome>,
    /// Buses never attempted because the batch stopped early.
    pub skipped: Vec<BusId>,
}

impl BatchReport {
    pub fn committed(&self) -> impl Iterator<Item = &NodeOutcome> {
        self.outcomes.iter().filter(|o| o.is_committed())
    }

    pub fn rolled_back(&self) -> impl Iterator<Item = &NodeOutcome> {
        self.outcomes.iter().filter(|o| o.is_rolled_back())
    }

    /// Every requested bus committed.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.outcomes.iter().all(NodeOutcome::is_committed)
    }

    /// Surface the first reconnection failure as an error.
    pub fn into_result(self) -> MutationResult<BatchReport> {
        let failure = self.outcomes.iter().find_map(|outcome| match outcome {
            NodeOutcome::RolledBack {
                bus,
                reason: RollbackReason::AttemptsExhausted { attempts },
                ..
            } => Some((*bus, *attempts)),
            _ => None,
        });
        match failure {
            Some((bus, attempts)) => Err(MutationError::ReconnectionFailure { bus, attempts }),
            None => Ok(self),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RelocationState {
    Active,
    Removed,
    Reconnecting { attempt: usize },
    RolledBack { attempts: usize },
}

/// Random source for a pass: seeded when the config carries a seed, entropy otherwise.
pub fn rng_from_config(config: &MutationConfig) -> StdRng {
    config
        .seed
        .map(StdRng::seed_from_u64)
        .unwrap_or_else(StdRng::from_entropy)
}

/// Relocate a single bus, committing a connected reconnection or restoring its lines.
///
/// The bus does not have to be non-critical; a critical bus usually exhausts its attempts
/// and rolls back.
pub fn relocate_node<R>(
    topology: &mut Topology,
    bus: BusId,
    config: &MutationConfig,
    rng: &mut R,
) -> MutationResult<NodeOutcome>
where
    R: Rng + ?Sized,
{
    config.validate()?;
    if !topology.contains_bus(bus) {
        return Err(MutationError::UnknownBus(bus));
    }

    let mut original_neighbors = BTreeSet::new();
    let mut state = RelocationState::Active;
    loop {
        debug!(%bus, ?state, "relocation step");
        state = match state {
            RelocationState::Active => {
                original_neighbors = topology
                    .remove_bus(bus)
                    .ok_or(MutationError::UnknownBus(bus))?;
                RelocationState::Removed
            }
            RelocationState::Removed => {
                topology.add_bus(bus);
                RelocationState::Reconnecting { attempt: 1 }
            }
            RelocationState::Reconnecting { attempt } => {
                if let Some(new_neighbors) =
                    try_reconnect(topology, bus, config.candidates_per_attempt, rng)?
                {
                    info!(%bus, attempt, neighbors = ?new_neighbors, "relocation committed");
                    return Ok(NodeOutcome::Committed {
                        bus,
                        previous_neighbors: original_neighbors,
                        new_neighbors,
                        attempts: attempt,
                    });
                }
                if attempt >= config.max_attempts {
                    RelocationState::RolledBack { attempts: attempt }
                } else {
                    RelocationState::Reconnecting {
                        attempt: attempt + 1,
                    }
                }
            }
            RelocationState::RolledBack { attempts } => {
                for neighbor in &original_neighbors {
                    topology.add_line(bus, *neighbor)?;
                }
                warn!(%bus, attempts, "could not reconnect, original lines restored");
                return Ok(NodeOutcome::RolledBack {
                    bus,
                    original_neighbors,
                    reason: RollbackReason::AttemptsExhausted { attempts },
                });
            }
        };
    }
}

/// One reconnection attempt. `bus` must be present with no lines; it is left that way on
/// failure.
fn try_reconnect<R>(
    topology: &mut Topology,
    bus: BusId,
    candidates_per_attempt: usize,
    rng: &mut R,
) -> MutationResult<Option<BTreeSet<BusId>>>
where
    R: Rng + ?Sized,
{
    let mut candidates: Vec<BusId> = topology.buses().filter(|b| *b != bus).collect();
    // bus order shifts on removal; sort so a seeded rng stays reproducible
    candidates.sort_unstable();
    candidates.shuffle(rng);

    let mut added = BTreeSet::new();
    for candidate in candidates.into_iter().take(candidates_per_attempt) {
        topology.add_line(bus, candidate)?;
        added.insert(candidate);
        if is_connected(topology) {
            return Ok(Some(added));
        }
    }
    debug!(%bus, tried = ?added, "attempt left the topology split");
    for candidate in &added {
        topology.remove_line(bus, *candidate);
    }
    Ok(None)
}

/// Relocate `buses` in order, applying the configured [`FailurePolicy`] on the first
/// reconnection failure.
///
/// Every bus is checked for existence before anything is mutated.
pub fn relocate_nodes<R>(
    topology: &mut Topology,
    buses: &[BusId],
    config: &MutationConfig,
    rng: &mut R,
) -> MutationResult<BatchReport>
where
    R: Rng + ?Sized,
{
    config.validate()?;
    if let Some(missing) = buses.iter().find(|bus| !topology.contains_bus(**bus)) {
        return Err(MutationError::UnknownBus(*missing));
    }

    let mut report = BatchReport {
        policy: config.failure_policy,
        outcomes: Vec::with_capacity(buses.len()),
        skipped: Vec::new(),
    };

    for (position, bus) in buses.iter().enumerate() {
        let outcome = relocate_node(topology, *bus, config, rng)?;
        let failed = outcome.is_rolled_back();
        report.outcomes.push(outcome);
        if !failed {
            continue;
        }
        match config.failure_policy {
            FailurePolicy::Continue => {}
            FailurePolicy::Stop => {
                report.skipped = buses[position + 1..].to_vec();
                break;
            }
            FailurePolicy::RevertBatch => {
                revert_commits(topology, &mut report.outcomes)?;
                report.skipped = buses[position + 1..].to_vec();
                break;
            }
        }
    }

    if !report.skipped.is_empty() {
        info!(skipped = ?report.skipped, policy = ?report.policy, "batch stopped early");
    }
    Ok(report)
}

/// Undo committed relocations, newest first, turning them into `BatchReverted` rollbacks.
fn revert_commits(topology: &mut Topology, outcomes: &mut [NodeOutcome]) -> MutationResult<()> {
    for outcome in outcomes.iter_mut().rev() {
        let NodeOutcome::Committed {
            bus,
            previous_neighbors,
            new_neighbors,
            ..
        } = outcome
        else {
            continue;
        };
        let bus = *bus;
        for neighbor in new_neighbors.iter() {
            topology.remove_line(bus, *neighbor);
        }
        for neighbor in previous_neighbors.iter() {
            topology.add_line(bus, *neighbor)?;
        }
        let original_neighbors = std::mem::take(previous_neighbors);
        debug!(%bus, "commit reverted");
        *outcome = NodeOutcome::RolledBack {
            bus,
            original_neighbors,
            reason: RollbackReason::BatchReverted,
        };
    }
    Ok(())
}

/// Full pass: check the input is connected, sample movable buses, relocate them.
///
/// Structural failures (`DisconnectedNetwork`, `InsufficientNodes`,
/// `InsufficientCandidates`) are returned before the topology is touched.
pub fn mutate_topology<D, R>(
    topology: &mut Topology,
    config: &MutationConfig,
    detector: &D,
    rng: &mut R,
) -> MutationResult<BatchReport>
where
    D: CriticalNodeDetector + ?Sized,
    R: Rng + ?Sized,
{
    config.validate()?;
    let islands = count_islands(topology);
    if islands > 1 {
        return Err(MutationError::DisconnectedNetwork(islands));
    }

    let chosen = sample_non_critical(topology, config.nodes_to_move, detector, rng)?;
    info!(
        buses = topology.bus_count(),
        lines = topology.line_count(),
        chosen = ?chosen,
        "starting mutation pass"
    );
    let report = relocate_nodes(topology, &chosen, config, rng)?;
    debug_assert!(is_connected(topology));
    info!(
        committed = report.committed().count(),
        rolled_back = report.rolled_back().count(),
        lines = topology.line_count(),
        "mutation pass finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::critical::ArticulationDetector;
    use gridshift_core::cases;
    use rand::rngs::mock::StepRng;

    fn b(id: usize) -> BusId {
        BusId::new(id)
    }

    #[test]
    fn leaf_of_star_is_reconnected() {
        let mut topology = cases::star(5);
        let mut rng = StdRng::seed_from_u64(42);
        let outcome =
            relocate_node(&mut topology, b(3), &MutationConfig::default(), &mut rng).unwrap();
        assert!(outcome.is_committed());
        assert!(is_connected(&topology));
        assert_eq!(topology.neighbor_set(b(3)), *outcome.neighbors());
    }

    #[test]
    fn cycle_bus_commits_on_first_line() {
        let mut topology = cases::cycle(6);
        let mut rng = StdRng::seed_from_u64(5);
        let outcome =
            relocate_node(&mut topology, b(2), &MutationConfig::default(), &mut rng).unwrap();
        match outcome {
            NodeOutcome::Committed {
                previous_neighbors,
                new_neighbors,
                attempts,
                ..
            } => {
                assert_eq!(previous_neighbors, BTreeSet::from([b(1), b(3)]));
                assert_eq!(new_neighbors.len(), 1);
                assert_eq!(attempts, 1);
            }
            other => panic!("expected commit, got {other:?}"),
        }
        assert_eq!(topology.line_count(), 5);
        assert!(is_connected(&topology));
    }

    #[test]
    fn star_center_with_three_leaves_rolls_back() {
        // three isolated leaves can never be joined with two lines
        let mut topology = cases::star(3);
        let before = topology.lines();
        let mut rng = StdRng::seed_from_u64(9);
        let outcome =
            relocate_node(&mut topology, b(0), &MutationConfig::default(), &mut rng).unwrap();
        assert_eq!(
            outcome,
            NodeOutcome::RolledBack {
                bus: b(0),
                original_neighbors: BTreeSet::from([b(1), b(2), b(3)]),
                reason: RollbackReason::AttemptsExhausted { attempts: 5 },
            }
        );
        assert_eq!(topology.lines(), before);
    }

    #[test]
    fn single_candidate_cannot_bridge_a_path() {
        let mut topology = cases::path(3);
        let config = MutationConfig::default()
            .with_candidates_per_attempt(1)
            .with_max_attempts(3);
        let mut rng = StepRng::new(0, 1);
        let outcome = relocate_node(&mut topology, b(1), &config, &mut rng).unwrap();
        assert!(outcome.is_rolled_back());
        assert_eq!(topology.neighbor_set(b(1)), BTreeSet::from([b(0), b(2)]));
    }

    #[test]
    fn unknown_bus_is_rejected_without_mutation() {
        let mut topology = cases::cycle(4);
        let before = topology.lines();
        let mut rng = StdRng::seed_from_u64(1);
        let err = relocate_nodes(
            &mut topology,
            &[b(1), b(77)],
            &MutationConfig::default(),
            &mut rng,
        )
        .unwrap_err();
        assert!(matches!(err, MutationError::UnknownBus(bus) if bus == b(77)));
        assert_eq!(topology.lines(), before);
    }

    #[test]
    fn disconnected_input_is_refused() {
        let mut topology = cases::path(4);
        topology.add_bus(b(9));
        let mut rng = StdRng::seed_from_u64(1);
        let err = mutate_topology(
            &mut topology,
            &MutationConfig::default().with_nodes_to_move(1),
            &ArticulationDetector,
            &mut rng,
        )
        .unwrap_err();
        assert!(matches!(err, MutationError::DisconnectedNetwork(2)));
    }

    #[test]
    fn outcomes_serialize_with_status_tag() {
        let outcome = NodeOutcome::Committed {
            bus: b(2),
            previous_neighbors: BTreeSet::from([b(1), b(3)]),
            new_neighbors: BTreeSet::from([b(5)]),
            attempts: 1,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "committed");
        assert_eq!(json["new_neighbors"], serde_json::json!([5]));
    }

    #[test]
    fn report_surfaces_first_failure() {
        let report = BatchReport {
            policy: FailurePolicy::Continue,
            outcomes: vec![NodeOutcome::RolledBack {
                bus: b(4),
                original_neighbors: BTreeSet::new(),
                reason: RollbackReason::AttemptsExhausted { attempts: 5 },
            }],
            skipped: Vec::new(),
        };
        assert!(!report.is_clean());
        assert!(matches!(
            report.into_result(),
            Err(MutationError::ReconnectionFailure { bus, attempts: 5 }) if bus == b(4)
        ));
    }
}
