//! Time-dependent shortest-path search.
//!
//! Label-setting search (Dijkstra, or A* when a heuristic is configured)
//! over line-aware states. A state is a stop together with the line the
//! rider is aboard and the stop they came from, so arriving somewhere on
//! line 7 and arriving there on line 12 are explored separately: the next
//! hop costs a transfer from one of them and not from the other.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use tracing::{debug, trace, warn};

use crate::domain::{Hop, StopId, TransitTime};
use crate::network::AdjacencyIndex;

use super::config::SearchConfig;
use super::mode::{CostMode, InvalidMode};
use super::state::{Route, SearchState, StateId, StateKey};

/// Error from a route search.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// Stop is not part of the network
    #[error("unknown stop: {0}")]
    InvalidStop(String),

    /// Unrecognized cost mode
    #[error(transparent)]
    InvalidMode(#[from] InvalidMode),

    /// The destination cannot be reached from the origin after the start time
    #[error("no connection from {origin} to {destination}")]
    NotFound { origin: String, destination: String },

    /// Request is inconsistent
    #[error("invalid search request: {0}")]
    InvalidRequest(String),

    /// Search expanded too many states
    #[error("search gave up after expanding {limit} states")]
    ExpansionLimit { limit: usize },
}

/// Resolve a stop name against the index.
pub fn resolve_stop(index: &AdjacencyIndex, name: &str) -> Result<StopId, SearchError> {
    index
        .stop_id(name)
        .ok_or_else(|| SearchError::InvalidStop(name.to_string()))
}

/// Request for a point-to-point search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub origin: StopId,
    pub destination: StopId,
    pub start_time: TransitTime,
    pub mode: CostMode,

    /// Terminal state of a previous leg to resume from.
    ///
    /// The search root takes over its line and predecessor, so staying on
    /// the same line is free and changing line needs the transfer wait.
    pub context: Option<SearchState>,
}

impl SearchRequest {
    /// Create a fresh request with no predecessor context.
    pub fn new(origin: StopId, destination: StopId, start_time: TransitTime, mode: CostMode) -> Self {
        Self {
            origin,
            destination,
            start_time,
            mode,
            context: None,
        }
    }

    /// Resume from the terminal state of a previous leg.
    ///
    /// The start time becomes the arrival time of that state.
    pub fn with_context(mut self, context: SearchState) -> Self {
        self.start_time = context.arrival;
        self.context = Some(context);
        self
    }

    /// Validate the request against the index.
    pub fn validate(&self, index: &AdjacencyIndex) -> Result<(), SearchError> {
        for stop in [self.origin, self.destination] {
            if !index.contains(stop) {
                return Err(SearchError::InvalidStop(format!("{stop:?}")));
            }
        }

        if let Some(context) = &self.context {
            if context.key.stop != self.origin {
                return Err(SearchError::InvalidRequest(
                    "context state is not at the origin".to_string(),
                ));
            }
            if context.arrival != self.start_time {
                return Err(SearchError::InvalidRequest(
                    "start time differs from context arrival".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Entry of the open set. Ordered by f, then earlier arrival, then age.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct OpenEntry {
    f: u64,
    arrival: TransitTime,
    id: StateId,
}

/// Open and closed sets over an arena of states.
///
/// Superseded heap entries are skipped lazily on pop instead of being
/// removed from the heap.
struct Frontier {
    arena: Vec<SearchState>,
    best: HashMap<StateKey, StateId>,
    closed: HashSet<StateKey>,
    open: BinaryHeap<Reverse<OpenEntry>>,
}

impl Frontier {
    fn new(root: SearchState) -> Self {
        let mut frontier = Self {
            arena: Vec::new(),
            best: HashMap::new(),
            closed: HashSet::new(),
            open: BinaryHeap::new(),
        };
        frontier.insert(root);
        frontier
    }

    fn insert(&mut self, state: SearchState) {
        let id = StateId(self.arena.len());
        self.arena.push(state);
        self.best.insert(state.key, id);
        self.open.push(Reverse(OpenEntry {
            f: state.f,
            arrival: state.arrival,
            id,
        }));
    }

    /// Pop the open state with minimum f, skipping superseded entries.
    fn pop(&mut self) -> Option<StateId> {
        while let Some(Reverse(entry)) = self.open.pop() {
            let key = self.arena[entry.id.0].key;
            if self.best.get(&key) == Some(&entry.id) && !self.closed.contains(&key) {
                return Some(entry.id);
            }
        }
        None
    }

    fn close(&mut self, id: StateId) {
        self.closed.insert(self.arena[id.0].key);
    }

    /// Offer a successor. Accepted only if strictly cheaper than the
    /// existing state with the same key; a closed key is reopened.
    fn offer(&mut self, state: SearchState) -> bool {
        if let Some(existing) = self.best.get(&state.key) {
            if state.total >= self.arena[existing.0].total {
                return false;
            }
        }
        if self.closed.remove(&state.key) {
            trace!(stop = ?state.key.stop, line = ?state.key.line, "reopened state");
        }
        self.insert(state);
        true
    }
}

/// Route search engine over an immutable schedule.
#[derive(Debug, Clone, Copy)]
pub struct SearchEngine<'a> {
    index: &'a AdjacencyIndex,
    config: &'a SearchConfig,
}

impl<'a> SearchEngine<'a> {
    /// Create a new engine.
    pub fn new(index: &'a AdjacencyIndex, config: &'a SearchConfig) -> Self {
        Self { index, config }
    }

    /// Find the minimum-cost route for `request`.
    ///
    /// The first time a state at the destination leaves the open set it is
    /// optimal and is returned.
    pub fn search(&self, request: &SearchRequest) -> Result<Route, SearchError> {
        request.validate(self.index)?;

        let destination = request.destination;
        let root_key = request
            .context
            .map(|c| c.key)
            .unwrap_or_else(|| StateKey::origin(request.origin));
        let root = SearchState::root(
            root_key,
            request.start_time,
            self.estimate(root_key.stop, destination),
        );

        let mut frontier = Frontier::new(root);
        let mut expansions = 0;

        while let Some(id) = frontier.pop() {
            let current = frontier.arena[id.0];

            if current.key.stop == destination {
                debug!(
                    origin = ?request.origin,
                    destination = ?destination,
                    mode = %request.mode,
                    cost = current.total,
                    arrival = %current.arrival,
                    expansions,
                    "route found"
                );
                return Ok(Route::from_arena(
                    &frontier.arena,
                    id,
                    request.start_time,
                    expansions,
                ));
            }

            frontier.close(id);
            expansions += 1;
            if expansions > self.config.max_expansions {
                warn!(
                    origin = ?request.origin,
                    destination = ?destination,
                    limit = self.config.max_expansions,
                    "search expansion limit reached"
                );
                return Err(SearchError::ExpansionLimit {
                    limit: self.config.max_expansions,
                });
            }

            trace!(
                stop = ?current.key.stop,
                line = ?current.key.line,
                total = current.total,
                arrival = %current.arrival,
                "expanding state"
            );
            self.expand(&current, id, request, &mut frontier);
        }

        debug!(
            origin = ?request.origin,
            destination = ?destination,
            expansions,
            "no route"
        );
        Err(SearchError::NotFound {
            origin: self.name(request.origin),
            destination: self.name(destination),
        })
    }

    /// Offer the earliest catchable trip of every departure group.
    fn expand(
        &self,
        current: &SearchState,
        current_id: StateId,
        request: &SearchRequest,
        frontier: &mut Frontier,
    ) {
        let stop = current.key.stop;
        let penalty = u64::from(request.mode.transfer_penalty_secs(self.config));
        let transfer_ready = current.arrival + self.config.min_transfer_wait();

        for group in self.index.departures(stop) {
            // Riding the same line straight back to where we came from is
            // a change of vehicle, not a continuation.
            let continuation = match current.key.line {
                None => true,
                Some(line) => {
                    line == group.line && current.key.predecessor != Some(group.destination)
                }
            };
            let ready = if continuation {
                current.arrival
            } else {
                transfer_ready
            };

            // Later departures in the group never arrive earlier
            let Some((departure, arrival)) = group.earliest_from(ready) else {
                continue;
            };

            let edge_cost = u64::from(arrival.seconds_since(current.arrival))
                + if continuation { 0 } else { penalty };
            let total = current.total + edge_cost;
            let heuristic = self.estimate(group.destination, request.destination);

            frontier.offer(SearchState {
                key: StateKey {
                    stop: group.destination,
                    line: Some(group.line),
                    predecessor: Some(stop),
                },
                edge_cost,
                total,
                heuristic,
                f: total + heuristic,
                arrival,
                parent: Some(current_id),
                via: Some(Hop {
                    line: group.line,
                    from: stop,
                    to: group.destination,
                    departure,
                    arrival,
                }),
                transfer: !continuation,
            });
        }
    }

    fn estimate(&self, from: StopId, to: StopId) -> u64 {
        self.config.heuristic.estimate(self.index, from, to)
    }

    fn name(&self, stop: StopId) -> String {
        self.index
            .stop_name(stop)
            .map(str::to_string)
            .unwrap_or_else(|| format!("{stop:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::AdjacencyIndexBuilder;

    fn time(s: &str) -> TransitTime {
        TransitTime::parse_hhmmss(s).unwrap()
    }

    fn two_stop_index() -> AdjacencyIndex {
        let mut b = AdjacencyIndexBuilder::new();
        b.add_trip("1", "A", "B", time("08:00:00"), time("08:10:00"))
            .unwrap();
        b.build()
    }

    #[test]
    fn resolve_unknown_stop() {
        let index = two_stop_index();
        assert_eq!(
            resolve_stop(&index, "Nowhere"),
            Err(SearchError::InvalidStop("Nowhere".to_string()))
        );
        assert!(resolve_stop(&index, "A").is_ok());
    }

    #[test]
    fn stop_from_another_index_is_invalid() {
        let index = two_stop_index();
        let config = SearchConfig::default();
        let engine = SearchEngine::new(&index, &config);

        let a = index.stop_id("A").unwrap();
        let request = SearchRequest::new(a, StopId(42), time("08:00:00"), CostMode::Time);
        assert!(matches!(
            engine.search(&request),
            Err(SearchError::InvalidStop(_))
        ));
    }

    #[test]
    fn context_must_sit_at_origin() {
        let index = two_stop_index();
        let config = SearchConfig::default();
        let engine = SearchEngine::new(&index, &config);
        let a = index.stop_id("A").unwrap();
        let b = index.stop_id("B").unwrap();

        let elsewhere = SearchState::root(StateKey::origin(b), time("08:00:00"), 0);
        let request =
            SearchRequest::new(a, b, time("08:00:00"), CostMode::Time).with_context(elsewhere);
        assert!(matches!(
            engine.search(&request),
            Err(SearchError::InvalidRequest(_))
        ));
    }

    #[test]
    fn context_sets_start_time() {
        let index = two_stop_index();
        let a = index.stop_id("A").unwrap();
        let b = index.stop_id("B").unwrap();
        let context = SearchState::root(StateKey::origin(a), time("07:30:00"), 0);

        let request =
            SearchRequest::new(a, b, time("06:00:00"), CostMode::Time).with_context(context);
        assert_eq!(request.start_time, time("07:30:00"));
        assert!(request.validate(&index).is_ok());

        let mut skewed = request.clone();
        skewed.start_time = time("07:31:00");
        assert!(skewed.validate(&index).is_err());
    }

    #[test]
    fn error_display() {
        let err = SearchError::NotFound {
            origin: "A".into(),
            destination: "B".into(),
        };
        assert_eq!(err.to_string(), "no connection from A to B");

        let err = SearchError::ExpansionLimit { limit: 10 };
        assert_eq!(err.to_string(), "search gave up after expanding 10 states");
    }
}
