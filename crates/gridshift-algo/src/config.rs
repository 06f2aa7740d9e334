use serde::{Deserialize, Serialize};

use crate::error::{MutationError, MutationResult};

/// What to do with the rest of a batch after one bus fails to reconnect.
///
/// The failed bus itself is always restored to its original lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Keep processing the remaining buses and report partial results.
    #[default]
    Continue,
    /// Stop at the failed bus. Earlier commits stay; later buses are reported as skipped.
    Stop,
    /// Stop at the failed bus and undo every earlier commit of the batch.
    RevertBatch,
}

/// Settings for one mutation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MutationConfig {
    /// Number of buses to relocate.
    pub nodes_to_move: usize,

    /// Reconnection attempts per bus before rolling back.
    pub max_attempts: usize,

    /// Candidate lines tried per attempt.
    pub candidates_per_attempt: usize,

    /// Seed for the random source. `None` draws from OS entropy.
    pub seed: Option<u64>,

    pub failure_policy: FailurePolicy,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            nodes_to_move: 3,
            max_attempts: 5,
            candidates_per_attempt: 2,
            seed: None,
            failure_policy: FailurePolicy::Continue,
        }
    }
}

impl MutationConfig {
    pub fn with_nodes_to_move(mut self, nodes_to_move: usize) -> Self {
        self.nodes_to_move = nodes_to_move;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_candidates_per_attempt(mut self, candidates: usize) -> Self {
        self.candidates_per_attempt = candidates;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn validate(&self) -> MutationResult<()> {
        if self.max_attempts == 0 {
            return Err(MutationError::InvalidConfig(
                "max_attempts must be >= 1".to_string(),
            ));
        }
        if self.candidates_per_attempt == 0 {
            return Err(MutationError::InvalidConfig(
                "candidates_per_attempt must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}
