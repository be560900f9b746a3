//! Round-trip itineraries evaluated through the route cache.

use std::sync::Arc;

use tracing::debug;

use crate::domain::{StopId, TransitTime};
use crate::network::AdjacencyIndex;
use crate::planner::{CacheStats, CostMode, Route, RouteCache, SearchConfig, SearchError, resolve_stop};

use super::config::TabuConfig;
use super::tabu::{TabuSequencer, TourCost};

/// One leg of a round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TourLeg {
    pub from: StopId,
    pub to: StopId,
    pub route: Arc<Route>,
}

/// Chains the legs origin, waypoints in order, origin.
///
/// Each leg resumes from the terminal state of the previous one, so staying
/// aboard across a waypoint is free and changing lines there pays the usual
/// transfer wait and penalty.
pub struct ItineraryEvaluator<'a> {
    cache: RouteCache<'a>,
    origin: StopId,
    waypoints: Vec<StopId>,
    start_time: TransitTime,
}

impl<'a> ItineraryEvaluator<'a> {
    pub fn new(
        index: &'a AdjacencyIndex,
        config: &'a SearchConfig,
        mode: CostMode,
        origin: StopId,
        waypoints: Vec<StopId>,
        start_time: TransitTime,
    ) -> Self {
        Self {
            cache: RouteCache::new(index, config, mode),
            origin,
            waypoints,
            start_time,
        }
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Resolve every leg of the round trip in `order`.
    ///
    /// Fails with the error of the first leg that cannot be completed.
    pub fn legs(&mut self, order: &[usize]) -> Result<Vec<TourLeg>, SearchError> {
        let mut stops = Vec::with_capacity(order.len() + 2);
        stops.push(self.origin);
        for &k in order {
            let stop = self.waypoints.get(k).copied().ok_or_else(|| {
                SearchError::InvalidRequest(format!("waypoint index {k} out of range"))
            })?;
            stops.push(stop);
        }
        stops.push(self.origin);

        let mut legs = Vec::with_capacity(stops.len() - 1);
        let mut start = self.start_time;
        let mut context = None;
        for pair in stops.windows(2) {
            let route = self
                .cache
                .get_or_compute(pair[0], pair[1], start, context.as_ref())?;
            start = route.arrival();
            context = Some(*route.terminal());
            legs.push(TourLeg {
                from: pair[0],
                to: pair[1],
                route,
            });
        }
        Ok(legs)
    }
}

impl TourCost for ItineraryEvaluator<'_> {
    fn cost(&mut self, order: &[usize]) -> f64 {
        match self.legs(order) {
            Ok(legs) => legs.iter().map(|leg| leg.route.total_cost() as f64).sum(),
            Err(_) => f64::INFINITY,
        }
    }
}

/// Multi-waypoint round-trip query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TourRequest {
    pub origin: String,
    pub waypoints: Vec<String>,
    pub start_time: TransitTime,
    pub mode: CostMode,
}

/// Best round trip found by one sequencing session.
#[derive(Debug, Clone, PartialEq)]
pub struct TourPlan {
    /// Waypoint indices (into the request) in visiting order.
    pub order: Vec<usize>,
    /// Sum of the leg costs.
    pub cost: u64,
    /// Legs from the origin through every waypoint and back.
    pub legs: Vec<TourLeg>,
    pub iterations: usize,
    pub evaluations: usize,
    pub cache: CacheStats,
    pub seed: u64,
}

impl TourPlan {
    /// Arrival back at the origin.
    pub fn arrival(&self) -> Option<TransitTime> {
        self.legs.last().map(|leg| leg.route.arrival())
    }

    /// Line changes over the whole trip.
    pub fn transfers(&self) -> usize {
        self.legs.iter().map(|leg| leg.route.transfers()).sum()
    }
}

/// Find a good visiting order for `request` and resolve its legs.
///
/// Runs one sequencing session with a private route cache, then replays the
/// best order through the same cache.
pub fn plan_tour(
    index: &AdjacencyIndex,
    config: &SearchConfig,
    tabu: &TabuConfig,
    request: &TourRequest,
) -> Result<TourPlan, SearchError> {
    if request.waypoints.is_empty() {
        return Err(SearchError::InvalidRequest(
            "a tour needs at least one waypoint".to_string(),
        ));
    }

    let origin = resolve_stop(index, &request.origin)?;
    let waypoints = request
        .waypoints
        .iter()
        .map(|name| resolve_stop(index, name))
        .collect::<Result<Vec<_>, _>>()?;

    let mut evaluator = ItineraryEvaluator::new(
        index,
        config,
        request.mode,
        origin,
        waypoints,
        request.start_time,
    );
    let outcome = TabuSequencer::new(tabu.clone()).run(request.waypoints.len(), &mut evaluator);

    // Only fails when every order tried was infeasible
    let legs = evaluator.legs(&outcome.order)?;
    let cost = legs.iter().map(|leg| leg.route.total_cost()).sum();

    debug!(
        origin = %request.origin,
        waypoints = request.waypoints.len(),
        cost,
        evaluations = outcome.evaluations,
        "tour planned"
    );

    Ok(TourPlan {
        order: outcome.order,
        cost,
        legs,
        iterations: outcome.iterations,
        evaluations: outcome.evaluations,
        cache: evaluator.cache_stats(),
        seed: outcome.seed,
    })
}
