use gridshift_core::{BusId, Topology};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::critical::CriticalNodeDetector;
use crate::error::{MutationError, MutationResult};

/// Draw `k` distinct non-critical buses uniformly at random, without replacement.
///
/// The bus-count check runs before any classification work. Candidates are taken in
/// ascending id order before drawing, so a seeded `rng` reproduces the same selection.
pub fn sample_non_critical<D, R>(
    topology: &Topology,
    k: usize,
    detector: &D,
    rng: &mut R,
) -> MutationResult<Vec<BusId>>
where
    D: CriticalNodeDetector + ?Sized,
    R: Rng + ?Sized,
{
    let available = topology.bus_count();
    if available <= k {
        return Err(MutationError::InsufficientNodes {
            available,
            requested: k,
        });
    }

    let candidates = detector.classify(topology).non_critical();
    if candidates.len() < k {
        return Err(MutationError::InsufficientCandidates {
            available: candidates.len(),
            requested: k,
        });
    }

    let chosen: Vec<BusId> = candidates.choose_multiple(rng, k).copied().collect();
    debug!(
        candidates = candidates.len(),
        chosen = ?chosen,
        "sampled non-critical buses"
    );
    Ok(chosen)
}
