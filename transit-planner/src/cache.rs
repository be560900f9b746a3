//! Caching layer for point-query responses.
//!
//! The schedule is loaded once and never changes, so a finished point query
//! stays correct for the life of the process. Entries are still bounded by a
//! TTL and a capacity to keep memory in check.
//!
//! Only finished outcomes are stored here. Multi-waypoint sessions keep their
//! own private [`RouteCache`](crate::planner::RouteCache) and never read or
//! write this one.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;

use crate::domain::{StopId, TransitTime};
use crate::planner::{CostMode, Route, SearchError};

/// Cache key for point queries: (origin, destination, start time, mode).
pub type QueryKey = (StopId, StopId, TransitTime, CostMode);

/// Cached point-query outcome, failures included.
pub type QueryOutcome = Result<Arc<Route>, SearchError>;

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(10 * 60),
            max_capacity: 10_000,
        }
    }
}

/// Shared cache of point-query outcomes.
#[derive(Clone)]
pub struct RouteResponseCache {
    routes: MokaCache<QueryKey, QueryOutcome>,
}

impl RouteResponseCache {
    /// Create a new cache with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let routes = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { routes }
    }

    pub async fn get(&self, key: &QueryKey) -> Option<QueryOutcome> {
        self.routes.get(key).await
    }

    pub async fn insert(&self, key: QueryKey, outcome: QueryOutcome) {
        self.routes.insert(key, outcome).await;
    }

    /// Approximate number of entries.
    pub fn entry_count(&self) -> u64 {
        self.routes.entry_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::AdjacencyIndexBuilder;
    use crate::planner::{SearchConfig, SearchEngine, SearchRequest};

    fn time(s: &str) -> TransitTime {
        TransitTime::parse_hhmmss(s).unwrap()
    }

    #[test]
    fn default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(600));
        assert_eq!(config.max_capacity, 10_000);
    }

    #[test]
    fn cache_creation() {
        let cache = RouteResponseCache::new(&CacheConfig::default());
        assert_eq!(cache.entry_count(), 0);
    }

    #[tokio::test]
    async fn stored_route_is_shared() {
        let mut b = AdjacencyIndexBuilder::new();
        b.add_trip("1", "A", "B", time("08:00:00"), time("08:10:00"))
            .unwrap();
        let index = b.build();
        let config = SearchConfig::default();
        let a = index.stop_id("A").unwrap();
        let dest = index.stop_id("B").unwrap();
        let key = (a, dest, time("07:55:00"), CostMode::Time);
        let cache = RouteResponseCache::new(&CacheConfig::default());

        assert_eq!(cache.get(&key).await, None);

        let route = SearchEngine::new(&index, &config)
            .search(&SearchRequest::new(a, dest, time("07:55:00"), CostMode::Time))
            .map(Arc::new);
        cache.insert(key, route.clone()).await;

        let cached = cache.get(&key).await.unwrap().unwrap();
        assert!(Arc::ptr_eq(&cached, &route.unwrap()));
        assert_eq!(cached.arrival(), time("08:10:00"));
    }

    #[tokio::test]
    async fn failures_are_cached_per_mode() {
        let cache = RouteResponseCache::new(&CacheConfig::default());
        let a = crate::domain::StopId(0);
        let b = crate::domain::StopId(1);
        let not_found = SearchError::NotFound {
            origin: "A".to_string(),
            destination: "B".to_string(),
        };

        cache
            .insert((a, b, time("08:00:00"), CostMode::Time), Err(not_found.clone()))
            .await;

        assert_eq!(
            cache.get(&(a, b, time("08:00:00"), CostMode::Time)).await,
            Some(Err(not_found))
        );
        assert_eq!(
            cache.get(&(a, b, time("08:00:00"), CostMode::Transfers)).await,
            None
        );
    }
}
