//! # gridshift-algo: Connectivity-Preserving Topology Mutation
//!
//! Perturbs a distribution feeder by relocating a few buses while keeping the network in a
//! single connected component, so the result can be handed to a power-flow tool for
//! resilience studies.
//!
//! ## Pipeline
//!
//! 1. [`CriticalNodeDetector`] classifies every bus: removing a critical bus would split the
//!    feeder. [`ArticulationDetector`] does this in linear time, [`RemovalDetector`] is the
//!    remove-and-check reference it is tested against.
//! 2. [`sample_non_critical`] draws the requested number of movable buses at random.
//! 3. [`relocate_nodes`] detaches each bus and reconnects it to random candidates, with a
//!    bounded number of attempts and a rollback to the original lines when all fail.
//!
//! [`mutate_topology`] runs all three steps. The random source is always injected, so a
//! seeded `StdRng` makes a pass reproducible.
//!
//! ## Example
//!
//! ```rust
//! use gridshift_algo::{mutate_topology, rng_from_config, ArticulationDetector, MutationConfig};
//! use gridshift_core::{cases, is_connected};
//!
//! let mut feeder = cases::case33bw();
//! let config = MutationConfig::default().with_seed(7);
//! let mut rng = rng_from_config(&config);
//!
//! let report = mutate_topology(&mut feeder, &config, &ArticulationDetector, &mut rng).unwrap();
//! assert_eq!(report.outcomes.len(), 3);
//! assert!(is_connected(&feeder));
//! ```
//!
//! ## Failure handling
//!
//! Structural problems (too few buses, too few movable buses, an already islanded input)
//! are returned as [`MutationError`] before anything changes. A bus that cannot be
//! reconnected is rolled back on its own; what happens to the rest of the batch is chosen
//! by [`FailurePolicy`].

pub mod config;
pub mod critical;
pub mod error;
pub mod mutator;
pub mod sampler;

pub use config::{FailurePolicy, MutationConfig};
pub use critical::{ArticulationDetector, Classification, CriticalNodeDetector, RemovalDetector};
pub use error::{MutationError, MutationResult};
pub use mutator::{
    mutate_topology, relocate_node, relocate_nodes, rng_from_config, BatchReport, NodeOutcome,
    RollbackReason,
};
pub use sampler::sample_non_critical;
