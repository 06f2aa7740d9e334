//! TOML configuration for mutation runs.
//!
//! ```toml
//! [mutation]
//! nodes_to_move = 3
//! max_attempts = 5
//! candidates_per_attempt = 2
//! seed = 42
//! failure_policy = "continue"   # continue | stop | revert-batch
//! ```
//!
//! Missing keys (or a missing `[mutation]` table) fall back to defaults.

use std::path::Path;

use anyhow::{Context, Result};
use gridshift_algo::MutationConfig;
use serde::{Deserialize, Serialize};

use crate::cli::MutateArgs;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridshiftConfig {
    pub mutation: MutationConfig,
}

impl GridshiftConfig {
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("parsing config {}", path.display()))
    }
}

/// Resolve the effective mutation settings: defaults, then the config file, then flags.
pub fn resolve_mutation_config(args: &MutateArgs) -> Result<MutationConfig> {
    let mut config = match &args.config {
        Some(path) => GridshiftConfig::load_from(path)?.mutation,
        None => MutationConfig::default(),
    };
    if let Some(count) = args.count {
        config.nodes_to_move = count;
    }
    if let Some(max_attempts) = args.max_attempts {
        config.max_attempts = max_attempts;
    }
    if let Some(candidates) = args.candidates {
        config.candidates_per_attempt = candidates;
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(policy) = args.policy {
        config.failure_policy = policy.into();
    }
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use gridshift_algo::FailurePolicy;
    use tempfile::tempdir;

    fn mutate_args(extra: &[&str]) -> MutateArgs {
        let mut argv = vec!["gridshift", "mutate", "case33bw"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Mutate(args) => args,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn flags_override_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gridshift.toml");
        std::fs::write(
            &path,
            "[mutation]\nnodes_to_move = 4\nseed = 1\nfailure_policy = \"stop\"\n",
        )
        .unwrap();
        let path_str = path.to_str().unwrap();
        let config =
            resolve_mutation_config(&mutate_args(&["--config", path_str, "--seed", "8"])).unwrap();
        assert_eq!(config.nodes_to_move, 4);
        assert_eq!(config.seed, Some(8));
        assert_eq!(config.failure_policy, FailurePolicy::Stop);
        assert_eq!(config.max_attempts, 5);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(resolve_mutation_config(&mutate_args(&["--max-attempts", "0"])).is_err());
    }

    #[test]
    fn empty_file_means_defaults() {
        let config: GridshiftConfig = toml::from_str("").unwrap();
        assert_eq!(config, GridshiftConfig::default());
    }
}
