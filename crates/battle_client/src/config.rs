//! Client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunables of a [`BattleEngine`](crate::BattleEngine).
///
/// # Example RON
///
/// ```ron
/// ClientConfig(
///     max_parallel_runs: 4,
///     default_timeout_ms: Some(30000),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Maximum engine processes a batch runs at once (0 = one per CPU).
    pub max_parallel_runs: usize,
    /// Per-run time limit used when a call passes no timeout (None = unbounded).
    pub default_timeout_ms: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            max_parallel_runs: 0,
            default_timeout_ms: None,
        }
    }
}

impl ClientConfig {
    /// Set the batch worker limit.
    pub fn with_parallel_runs(mut self, runs: usize) -> Self {
        self.max_parallel_runs = runs;
        self
    }

    /// Set the default per-run timeout.
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Default per-run timeout.
    pub fn default_timeout(&self) -> Option<Duration> {
        self.default_timeout_ms.map(Duration::from_millis)
    }

    /// Worker threads a batch pool gets.
    pub fn worker_threads(&self) -> usize {
        if self.max_parallel_runs > 0 {
            self.max_parallel_runs
        } else {
            std::thread::available_parallelism().map_or(1, |n| n.get())
        }
    }
}
