//! Waypoint sequencing by tabu search.
//!
//! Given an origin and a set of waypoints, find a visiting order for a round
//! trip that keeps the total cost low. The cost of an order comes from
//! chaining point-to-point searches through a session-private
//! [`RouteCache`](crate::planner::RouteCache).

mod config;
mod itinerary;
mod tabu;

pub use config::TabuConfig;
pub use itinerary::{ItineraryEvaluator, TourLeg, TourPlan, TourRequest, plan_tour};
pub use tabu::{Swap, TabuList, TabuOutcome, TabuSequencer, TourCost};
