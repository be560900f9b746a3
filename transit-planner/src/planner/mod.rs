//! Route planner using time-dependent A* search.
//!
//! This module implements the point-to-point search: given an origin, a
//! destination and a start time, find the cheapest way through the
//! timetable under the chosen cost mode.
//!
//! The search runs over line-aware states, so changing lines can be charged
//! a minimum wait and a penalty. A per-session [`RouteCache`] memoizes
//! searches and lets one leg's final state carry into the next leg.

mod config;
mod heuristic;
mod mode;
mod route_cache;
mod search;
mod state;


pub use config::SearchConfig;
pub use heuristic::Heuristic;
pub use mode::{CostMode, InvalidMode};
pub use route_cache::{CacheStats, RouteCache};
pub use search::{SearchEngine, SearchError, SearchRequest, resolve_stop};
pub use state::{Route, SearchState, StateId, StateKey};
