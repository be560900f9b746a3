//! Tabu search over visiting orders.
//!
//! # Algorithm
//!
//! 1. Shuffle the waypoints into a random initial order
//! 2. For each outer step, run a fixed number of inner iterations:
//!    a. Build the swap neighborhood (all swaps, or a random sample)
//!    b. Pick the cheapest admissible swap: not tabu, or tabu but beating
//!       the current cost by at least the aspiration margin
//!    c. Apply it even when it is worse, and record it in the tabu list;
//!       an iteration with no admissible swap records nothing but still ages
//!       the list
//! 3. After each outer step, keep the current order if it beats the best

use std::collections::{HashMap, VecDeque};

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{debug, info};

use super::config::TabuConfig;

/// Cost oracle for a visiting order.
///
/// `order[k]` is the index of the waypoint visited k-th. Infeasible orders
/// cost `f64::INFINITY`.
pub trait TourCost {
    fn cost(&mut self, order: &[usize]) -> f64;
}

/// A swap of two positions, `i < j`.
pub type Swap = (usize, usize);

/// Result of a sequencing run.
#[derive(Debug, Clone, PartialEq)]
pub struct TabuOutcome {
    /// Best visiting order found.
    pub order: Vec<usize>,
    /// Cost of `order`.
    pub cost: f64,
    /// Inner iterations executed.
    pub iterations: usize,
    /// Distinct orders handed to the cost oracle.
    pub evaluations: usize,
    /// Best cost after each outer step.
    pub history: Vec<f64>,
    /// Seed the run used.
    pub seed: u64,
}

/// Swaps applied within the last `capacity` iterations.
///
/// Every iteration takes one slot, including one that applied no move, so
/// a swap stays tabu for exactly `capacity` iterations.
#[derive(Debug, Clone)]
pub struct TabuList {
    moves: VecDeque<Option<Swap>>,
    capacity: usize,
}

impl TabuList {
    pub fn new(capacity: usize) -> Self {
        Self {
            moves: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn contains(&self, swap: Swap) -> bool {
        self.moves.contains(&Some(swap))
    }

    /// Record a swap, evicting the oldest iteration beyond capacity.
    pub fn push(&mut self, swap: Swap) {
        self.record(Some(swap));
    }

    /// Record an iteration that applied no move.
    pub fn idle(&mut self) {
        self.record(None);
    }

    fn record(&mut self, entry: Option<Swap>) {
        self.moves.push_back(entry);
        while self.moves.len() > self.capacity {
            self.moves.pop_front();
        }
    }

    /// Number of swaps currently tabu.
    pub fn len(&self) -> usize {
        self.moves.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a candidate may be taken from the current solution.
    pub fn admits(&self, swap: Swap, current_cost: f64, candidate_cost: f64, epsilon: f64) -> bool {
        !self.contains(swap) || current_cost - candidate_cost >= epsilon
    }
}

/// Memoizing wrapper around a cost oracle for one run.
struct Memo<'c, C> {
    oracle: &'c mut C,
    costs: HashMap<Vec<usize>, f64>,
}

impl<'c, C: TourCost> Memo<'c, C> {
    fn new(oracle: &'c mut C) -> Self {
        Self {
            oracle,
            costs: HashMap::new(),
        }
    }

    fn cost(&mut self, order: &[usize]) -> f64 {
        if let Some(&cost) = self.costs.get(order) {
            return cost;
        }
        let cost = self.oracle.cost(order);
        self.costs.insert(order.to_vec(), cost);
        cost
    }

    fn evaluations(&self) -> usize {
        self.costs.len()
    }
}

/// Tabu search sequencer.
#[derive(Debug, Clone, Default)]
pub struct TabuSequencer {
    config: TabuConfig,
}

impl TabuSequencer {
    pub fn new(config: TabuConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TabuConfig {
        &self.config
    }

    /// Order `waypoints` waypoints to minimize `oracle`.
    pub fn run<C: TourCost>(&self, waypoints: usize, oracle: &mut C) -> TabuOutcome {
        let seed = self.config.seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut memo = Memo::new(oracle);

        let mut current: Vec<usize> = (0..waypoints).collect();
        current.shuffle(&mut rng);
        let mut current_cost = memo.cost(&current);
        let mut best = current.clone();
        let mut best_cost = current_cost;

        let swaps: Vec<Swap> = (0..waypoints)
            .flat_map(|i| (i + 1..waypoints).map(move |j| (i, j)))
            .collect();
        if swaps.is_empty() {
            return TabuOutcome {
                order: best,
                cost: best_cost,
                iterations: 0,
                evaluations: memo.evaluations(),
                history: Vec::new(),
                seed,
            };
        }

        let mut tabu = TabuList::new(self.config.tabu_size);
        let mut history = Vec::with_capacity(self.config.outer_steps);
        let mut iterations = 0;

        for step in 0..self.config.outer_steps {
            for _ in 0..self.config.inner_steps {
                iterations += 1;
                let neighborhood = self.neighborhood(&swaps, &mut rng);
                let Some((swap, cost)) =
                    self.select(&current, current_cost, &neighborhood, &tabu, &mut memo)
                else {
                    tabu.idle();
                    continue;
                };

                current.swap(swap.0, swap.1);
                current_cost = cost;
                tabu.push(swap);
            }

            if current_cost < best_cost {
                best.clone_from(&current);
                best_cost = current_cost;
            }
            history.push(best_cost);

            debug!(
                step,
                current = current_cost,
                best = best_cost,
                evaluations = memo.evaluations(),
                "tabu outer step"
            );
        }

        info!(
            waypoints,
            seed,
            iterations,
            evaluations = memo.evaluations(),
            cost = best_cost,
            "tabu search finished"
        );

        TabuOutcome {
            order: best,
            cost: best_cost,
            iterations,
            evaluations: memo.evaluations(),
            history,
            seed,
        }
    }

    /// All swaps, or a random sample of them above the size threshold.
    fn neighborhood(&self, swaps: &[Swap], rng: &mut StdRng) -> Vec<Swap> {
        if swaps.len() <= self.config.neighborhood_limit {
            return swaps.to_vec();
        }
        let amount = self.config.sample_size.min(swaps.len());
        rand::seq::index::sample(rng, swaps.len(), amount)
            .into_iter()
            .map(|k| swaps[k])
            .collect()
    }

    /// Cheapest admissible candidate; the first one wins ties.
    fn select<C: TourCost>(
        &self,
        current: &[usize],
        current_cost: f64,
        neighborhood: &[Swap],
        tabu: &TabuList,
        memo: &mut Memo<'_, C>,
    ) -> Option<(Swap, f64)> {
        let mut chosen: Option<(Swap, f64)> = None;
        let mut candidate = current.to_vec();

        for &swap in neighborhood {
            candidate.swap(swap.0, swap.1);
            let cost = memo.cost(&candidate);
            candidate.swap(swap.0, swap.1);

            if !tabu.admits(swap, current_cost, cost, self.config.aspiration_epsilon) {
                continue;
            }
            if chosen.is_none_or(|(_, best)| cost < best) {
                chosen = Some((swap, cost));
            }
        }

        chosen
    }
}
