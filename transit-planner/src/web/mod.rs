//! Web layer for the transit planner.
//!
//! Provides JSON endpoints for stop lookup, point-to-point routes and
//! multi-waypoint round trips.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
