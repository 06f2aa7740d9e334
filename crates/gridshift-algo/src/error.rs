use gridshift_core::{BusId, GridError};
use thiserror::Error;

/// Errors raised by the classification, sampling and mutation pipeline.
///
/// The structural checks (`InsufficientNodes`, `InsufficientCandidates`,
/// `DisconnectedNetwork`) are raised before anything is mutated.
#[derive(Debug, Error)]
pub enum MutationError {
    /// Topology has no more buses than were requested
    #[error("Topology has {available} buses, need more than {requested} to move {requested}")]
    InsufficientNodes { available: usize, requested: usize },

    /// Too few buses can be moved without islanding the feeder
    #[error("Only {available} non-critical buses available, {requested} requested")]
    InsufficientCandidates { available: usize, requested: usize },

    /// Input topology is already split
    #[error("Topology is disconnected; found {0} islands")]
    DisconnectedNetwork(usize),

    /// Requested bus does not exist
    #[error("Bus {0} is not part of the topology")]
    UnknownBus(BusId),

    /// A bus could not be reconnected and was restored to its original lines
    #[error("Failed to maintain connectivity after moving bus {bus} ({attempts} attempts)")]
    ReconnectionFailure { bus: BusId, attempts: usize },

    /// Mutation settings are unusable
    #[error("Invalid mutation config: {0}")]
    InvalidConfig(String),

    /// Underlying topology operation failed
    #[error(transparent)]
    Grid(#[from] GridError),
}

pub type MutationResult<T> = Result<T, MutationError>;
