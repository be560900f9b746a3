//! Search configuration for the route planner.

use chrono::Duration;

use super::heuristic::Heuristic;

/// Configuration parameters for point-to-point search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Minimum wait when changing lines (seconds).
    /// Departures tighter than this after arrival cannot be caught on a transfer.
    pub min_transfer_wait_secs: u32,

    /// Cost added per line change in `Transfers` mode (seconds).
    /// Large enough to dominate incidental ride time.
    pub transfer_penalty_secs: u32,

    /// Estimate of remaining cost guiding the search.
    pub heuristic: Heuristic,

    /// Maximum number of states expanded before a search gives up.
    pub max_expansions: usize,
}

impl SearchConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(
        min_transfer_wait_secs: u32,
        transfer_penalty_secs: u32,
        heuristic: Heuristic,
        max_expansions: usize,
    ) -> Self {
        Self {
            min_transfer_wait_secs,
            transfer_penalty_secs,
            heuristic,
            max_expansions,
        }
    }

    /// Returns the minimum transfer wait as a Duration.
    pub fn min_transfer_wait(&self) -> Duration {
        Duration::seconds(i64::from(self.min_transfer_wait_secs))
    }

    /// Returns the transfer penalty as a Duration.
    pub fn transfer_penalty(&self) -> Duration {
        Duration::seconds(i64::from(self.transfer_penalty_secs))
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_transfer_wait_secs: 120, // 2 minutes
            transfer_penalty_secs: 1800, // 30 minutes
            heuristic: Heuristic::default(),
            max_expansions: 2_000_000,
        }
    }
}
