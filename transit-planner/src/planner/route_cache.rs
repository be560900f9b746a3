//! Per-session memoization of route searches.
//!
//! A multi-stop planning session asks for the same legs over and over while
//! it tries different visiting orders. The cache remembers every outcome,
//! including failures, keyed by the full query: origin, destination, start
//! time and the state the leg resumes from. The resume state is part of the
//! key because the same stop at the same time reached on a different line
//! can have a different best continuation.
//!
//! The schedule never changes during a session, so entries never go stale
//! and nothing is evicted. The cache lives exactly as long as one session.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::trace;

use crate::domain::{StopId, TransitTime};
use crate::network::AdjacencyIndex;

use super::config::SearchConfig;
use super::mode::CostMode;
use super::search::{SearchEngine, SearchError, SearchRequest};
use super::state::{Route, SearchState, StateKey};

/// Cache key: (origin, destination, start time, resume-state identity).
type RouteKey = (StopId, StopId, TransitTime, Option<StateKey>);

/// Cached search outcome.
type RouteEntry = Result<Arc<Route>, SearchError>;

/// Hit and miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    /// Every miss runs exactly one search.
    pub misses: usize,
}

/// Memoizing front end to [`SearchEngine`] for one planning session.
pub struct RouteCache<'a> {
    engine: SearchEngine<'a>,
    mode: CostMode,
    entries: HashMap<RouteKey, RouteEntry>,
    stats: CacheStats,
}

impl<'a> RouteCache<'a> {
    /// Create an empty cache for searches in `mode`.
    pub fn new(index: &'a AdjacencyIndex, config: &'a SearchConfig, mode: CostMode) -> Self {
        Self {
            engine: SearchEngine::new(index, config),
            mode,
            entries: HashMap::new(),
            stats: CacheStats::default(),
        }
    }

    /// Return the stored outcome for this exact query, or search and store.
    ///
    /// With a `context`, `start_time` must equal the context's arrival.
    pub fn get_or_compute(
        &mut self,
        origin: StopId,
        destination: StopId,
        start_time: TransitTime,
        context: Option<&SearchState>,
    ) -> Result<Arc<Route>, SearchError> {
        let key = (origin, destination, start_time, context.map(|c| c.key));

        if let Some(entry) = self.entries.get(&key) {
            self.stats.hits += 1;
            return entry.clone();
        }

        self.stats.misses += 1;
        let mut request = SearchRequest::new(origin, destination, start_time, self.mode);
        request.context = context.copied();
        let entry = self.engine.search(&request).map(Arc::new);

        trace!(
            origin = ?origin,
            destination = ?destination,
            start = %start_time,
            found = entry.is_ok(),
            "cached search outcome"
        );
        self.entries.insert(key, entry.clone());
        entry
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Number of stored outcomes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
