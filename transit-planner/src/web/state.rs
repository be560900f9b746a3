//! Application state for the web layer.

use std::sync::Arc;

use crate::cache::{CacheConfig, RouteResponseCache};
use crate::network::AdjacencyIndex;
use crate::planner::SearchConfig;
use crate::sequencer::TabuConfig;

/// Shared application state.
///
/// The schedule and configuration are read-only; sequencing sessions build
/// their own route caches per request.
#[derive(Clone)]
pub struct AppState {
    /// Schedule loaded at start-up
    pub index: Arc<AdjacencyIndex>,

    /// Point-to-point search configuration
    pub search: Arc<SearchConfig>,

    /// Waypoint sequencing configuration
    pub tabu: Arc<TabuConfig>,

    /// Finished point-query outcomes
    pub responses: RouteResponseCache,
}

impl AppState {
    /// Create a new app state.
    pub fn new(
        index: AdjacencyIndex,
        search: SearchConfig,
        tabu: TabuConfig,
        cache: &CacheConfig,
    ) -> Self {
        Self {
            index: Arc::new(index),
            search: Arc::new(search),
            tabu: Arc::new(tabu),
            responses: RouteResponseCache::new(cache),
        }
    }
}
