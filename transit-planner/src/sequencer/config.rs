//! Tabu search configuration.

/// Configuration parameters for waypoint sequencing.
///
/// # Examples
///
/// ```
/// use transit_planner::sequencer::TabuConfig;
///
/// let config = TabuConfig::default()
///     .with_outer_steps(10)
///     .with_tabu_size(5)
///     .with_seed(7);
/// assert_eq!(config.outer_steps, 10);
/// assert_eq!(config.tabu_size, 5);
/// assert_eq!(config.seed, Some(7));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TabuConfig {
    /// Number of outer steps. The best solution is updated after each one.
    pub outer_steps: usize,

    /// Inner iterations (applied moves) per outer step.
    pub inner_steps: usize,

    /// Capacity of the tabu list; the oldest move is evicted first.
    pub tabu_size: usize,

    /// A tabu move is admitted anyway when it beats the current cost by at
    /// least this much.
    pub aspiration_epsilon: f64,

    /// Largest swap neighborhood evaluated in full.
    pub neighborhood_limit: usize,

    /// Number of random swaps evaluated when the neighborhood is larger
    /// than `neighborhood_limit`.
    pub sample_size: usize,

    /// Random seed (None draws one).
    pub seed: Option<u64>,
}

impl Default for TabuConfig {
    fn default() -> Self {
        Self {
            outer_steps: 35,
            inner_steps: 30,
            tabu_size: 10,
            aspiration_epsilon: 0.1,
            neighborhood_limit: 300,
            sample_size: 120,
            seed: None,
        }
    }
}

impl TabuConfig {
    pub fn with_outer_steps(mut self, n: usize) -> Self {
        self.outer_steps = n;
        self
    }

    pub fn with_inner_steps(mut self, n: usize) -> Self {
        self.inner_steps = n;
        self
    }

    pub fn with_tabu_size(mut self, size: usize) -> Self {
        self.tabu_size = size;
        self
    }

    /// Sets the aspiration margin.
    pub fn with_aspiration_epsilon(mut self, epsilon: f64) -> Self {
        self.aspiration_epsilon = epsilon;
        self
    }

    /// Sets the full-neighborhood threshold and the sample size used above it.
    pub fn with_sampling(mut self, neighborhood_limit: usize, sample_size: usize) -> Self {
        self.neighborhood_limit = neighborhood_limit;
        self.sample_size = sample_size;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Total inner iterations of a run.
    pub fn total_iterations(&self) -> usize {
        self.outer_steps.saturating_mul(self.inner_steps)
    }
}
