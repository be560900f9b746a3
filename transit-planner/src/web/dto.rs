//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::{LineId, Ride, StopId, transfer_waits};
use crate::network::AdjacencyIndex;
use crate::planner::{CostMode, Route};
use crate::sequencer::{TourLeg, TourPlan};

/// Request to search stops by name.
#[derive(Debug, Deserialize)]
pub struct StopSearchRequest {
    /// Search query
    pub q: String,

    /// Maximum number of results (capped at 50)
    pub limit: Option<usize>,
}

/// A stop in search results.
#[derive(Debug, Serialize)]
pub struct StopResult {
    pub name: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

/// Response for stop search.
#[derive(Debug, Serialize)]
pub struct StopSearchResponse {
    pub stops: Vec<StopResult>,
}

/// Request to plan a point-to-point route.
#[derive(Debug, Deserialize)]
pub struct PlanRouteRequest {
    /// Origin stop name
    pub origin: String,

    /// Destination stop name
    pub destination: String,

    /// Start time in HH:MM:SS format
    pub start_time: String,

    /// `TIME` (default) or `TRANSFERS`
    pub mode: Option<String>,
}

/// Request to plan a round trip through several waypoints.
#[derive(Debug, Deserialize)]
pub struct PlanTourRequest {
    /// Origin stop name; the trip starts and ends here
    pub origin: String,

    /// Stop names to visit, in any order
    pub waypoints: Vec<String>,

    /// Start time in HH:MM:SS format
    pub start_time: String,

    /// `TIME` (default) or `TRANSFERS`
    pub mode: Option<String>,

    /// Number of independent sequencing runs; the best one wins
    pub restarts: Option<usize>,
}

/// A ride on one line.
#[derive(Debug, Serialize, PartialEq)]
pub struct RideResult {
    pub line: String,
    pub board: String,
    pub board_time: String,
    pub alight: String,
    pub alight_time: String,

    /// Number of stops travelled
    pub stops: usize,

    /// Minutes aboard
    pub ride_mins: i64,

    /// Minutes waited since the previous ride, if any
    pub wait_mins: Option<i64>,
}

/// A point-to-point route.
#[derive(Debug, Serialize)]
pub struct RouteResponse {
    pub origin: String,
    pub destination: String,
    pub mode: String,
    pub start_time: String,

    /// Departure of the first ride; absent when origin is the destination
    pub departure_time: Option<String>,
    pub arrival_time: String,

    /// Cost under the chosen mode, in seconds
    pub cost: u64,

    /// Number of line changes
    pub transfers: usize,

    /// Minutes waited at the origin
    pub initial_wait_mins: i64,
    pub rides: Vec<RideResult>,
}

/// One leg of a round trip.
#[derive(Debug, Serialize)]
pub struct TourLegResult {
    pub from: String,
    pub to: String,
    pub cost: u64,
    pub departure_time: Option<String>,
    pub arrival_time: String,
    pub rides: Vec<RideResult>,
}

/// A round trip through waypoints.
#[derive(Debug, Serialize)]
pub struct TourResponse {
    pub origin: String,
    pub mode: String,

    /// Waypoint names in visiting order
    pub order: Vec<String>,

    /// Sum of leg costs, in seconds
    pub cost: u64,
    pub arrival_time: Option<String>,
    pub transfers: usize,
    pub legs: Vec<TourLegResult>,

    /// Distinct orders evaluated by the winning run
    pub evaluations: usize,
    pub restarts: usize,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

// Conversion implementations

fn stop_name(index: &AdjacencyIndex, stop: StopId) -> String {
    index
        .stop_name(stop)
        .map(str::to_string)
        .unwrap_or_else(|| format!("{stop:?}"))
}

fn line_name(index: &AdjacencyIndex, line: LineId) -> String {
    index
        .line_name(line)
        .map(str::to_string)
        .unwrap_or_else(|| format!("{line:?}"))
}

impl StopResult {
    pub fn from_stop(index: &AdjacencyIndex, stop: StopId) -> Self {
        let coords = index.coords(stop);
        Self {
            name: stop_name(index, stop),
            lat: coords.map(|c| c.lat),
            lon: coords.map(|c| c.lon),
        }
    }
}

impl RideResult {
    /// Convert rides, attaching the wait before each one after the first.
    pub fn from_rides(index: &AdjacencyIndex, rides: &[Ride]) -> Vec<Self> {
        let waits = transfer_waits(rides);
        rides
            .iter()
            .enumerate()
            .map(|(k, ride)| Self {
                line: line_name(index, ride.line),
                board: stop_name(index, ride.board),
                board_time: ride.board_time.to_string(),
                alight: stop_name(index, ride.alight),
                alight_time: ride.alight_time.to_string(),
                stops: ride.hops,
                ride_mins: ride.ride_time().num_minutes(),
                wait_mins: k
                    .checked_sub(1)
                    .and_then(|prev| waits.get(prev))
                    .map(|wait| wait.num_minutes()),
            })
            .collect()
    }
}

impl RouteResponse {
    pub fn from_route(index: &AdjacencyIndex, route: &Route, mode: CostMode) -> Self {
        Self {
            origin: stop_name(index, route.root().stop()),
            destination: stop_name(index, route.terminal().stop()),
            mode: mode.to_string(),
            start_time: route.start_time().to_string(),
            departure_time: route.departure().map(|t| t.to_string()),
            arrival_time: route.arrival().to_string(),
            cost: route.total_cost(),
            transfers: route.transfers(),
            initial_wait_mins: route.initial_wait().num_minutes(),
            rides: RideResult::from_rides(index, &route.rides()),
        }
    }
}

impl TourLegResult {
    pub fn from_leg(index: &AdjacencyIndex, leg: &TourLeg) -> Self {
        Self {
            from: stop_name(index, leg.from),
            to: stop_name(index, leg.to),
            cost: leg.route.total_cost(),
            departure_time: leg.route.departure().map(|t| t.to_string()),
            arrival_time: leg.route.arrival().to_string(),
            rides: RideResult::from_rides(index, &leg.route.rides()),
        }
    }
}

impl TourResponse {
    pub fn from_plan(
        index: &AdjacencyIndex,
        request: &PlanTourRequest,
        plan: &TourPlan,
        mode: CostMode,
        restarts: usize,
    ) -> Self {
        Self {
            origin: request.origin.clone(),
            mode: mode.to_string(),
            order: plan
                .order
                .iter()
                .filter_map(|&k| request.waypoints.get(k).cloned())
                .collect(),
            cost: plan.cost,
            arrival_time: plan.arrival().map(|t| t.to_string()),
            transfers: plan.transfers(),
            legs: plan
                .legs
                .iter()
                .map(|leg| TourLegResult::from_leg(index, leg))
                .collect(),
            evaluations: plan.evaluations,
            restarts,
        }
    }
}
