//! Resolved engine configuration (A2, SPEC_FULL.md §4.7). The only
//! configuration surface in this crate: built once from CLI args, with one
//! environment-variable override for parallelism.

use crate::env;

/// Immutable configuration consumed by [`crate::engine::lint_diff`].
#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub parallelism: usize,
    pub verbose: bool,
    pub ignore_list: Vec<String>,
}

impl EngineConfig {
    /// Build from parsed CLI values. `cli_parallelism` is `None` when
    /// `--parallelism` was not given explicitly, in which case
    /// `CCLINT_PARALLELISM` is consulted, then the host's available
    /// parallelism.
    pub fn new(cli_parallelism: Option<usize>, verbose: bool, ignore_list: Vec<String>) -> Self {
        let parallelism = cli_parallelism
            .or_else(|| env::get_env_var(env::CCLINT_PARALLELISM).and_then(|v| v.parse().ok()))
            .unwrap_or_else(num_cpus::get);
        EngineConfig { parallelism, verbose, ignore_list }
    }
}
