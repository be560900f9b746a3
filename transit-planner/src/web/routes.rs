//! HTTP route handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use futures::future::join_all;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::domain::{TimeError, TransitTime};
use crate::planner::{CostMode, InvalidMode, SearchEngine, SearchError, SearchRequest, resolve_stop};
use crate::sequencer::{TourPlan, TourRequest, plan_tour};

use super::dto::*;
use super::state::AppState;

/// Upper bound on stop search results.
const MAX_STOP_RESULTS: usize = 50;

/// Upper bound on independent sequencing runs per tour request.
const MAX_RESTARTS: usize = 8;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/stops/search", get(search_stops))
        .route("/route", post(plan_route))
        .route("/tour", post(plan_round_trip))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Search stops by name.
async fn search_stops(
    State(state): State<AppState>,
    Query(req): Query<StopSearchRequest>,
) -> Json<StopSearchResponse> {
    let limit = req.limit.unwrap_or(10).min(MAX_STOP_RESULTS);
    let stops = state
        .index
        .search_stops(&req.q, limit)
        .into_iter()
        .map(|(stop, _)| StopResult::from_stop(&state.index, stop))
        .collect();

    Json(StopSearchResponse { stops })
}

/// Parse a JSON body, logging it on failure.
fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|e| {
        warn!(error = %e, body = %String::from_utf8_lossy(body), "invalid JSON body");
        AppError::BadRequest {
            message: format!("Invalid JSON: {e}"),
        }
    })
}

fn parse_mode(mode: Option<&str>) -> Result<CostMode, AppError> {
    Ok(mode.map(str::parse::<CostMode>).transpose()?.unwrap_or_default())
}

/// Plan a point-to-point route.
async fn plan_route(State(state): State<AppState>, body: Bytes) -> Result<Response, AppError> {
    let req: PlanRouteRequest = parse_body(&body)?;
    let mode = parse_mode(req.mode.as_deref())?;
    let start_time = TransitTime::parse_hhmmss(&req.start_time)?;
    let origin = resolve_stop(&state.index, &req.origin)?;
    let destination = resolve_stop(&state.index, &req.destination)?;
    let key = (origin, destination, start_time, mode);

    let outcome = match state.responses.get(&key).await {
        Some(outcome) => {
            debug!(origin = %req.origin, destination = %req.destination, "route cache hit");
            outcome
        }
        None => {
            let index = Arc::clone(&state.index);
            let config = Arc::clone(&state.search);
            let request = SearchRequest::new(origin, destination, start_time, mode);
            let outcome = tokio::task::spawn_blocking(move || {
                SearchEngine::new(&index, &config)
                    .search(&request)
                    .map(Arc::new)
            })
            .await
            .map_err(|e| AppError::Internal {
                message: format!("search task failed: {e}"),
            })?;
            state.responses.insert(key, outcome.clone()).await;
            outcome
        }
    };

    let route = outcome?;
    Ok(Json(RouteResponse::from_route(&state.index, &route, mode)).into_response())
}

/// Plan a round trip through waypoints.
///
/// Runs `restarts` independent sequencing sessions on the blocking pool,
/// each with its own route cache and seed, and keeps the cheapest plan.
async fn plan_round_trip(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, AppError> {
    let req: PlanTourRequest = parse_body(&body)?;
    let mode = parse_mode(req.mode.as_deref())?;
    let start_time = TransitTime::parse_hhmmss(&req.start_time)?;
    let restarts = req.restarts.unwrap_or(1).clamp(1, MAX_RESTARTS);

    let request = Arc::new(TourRequest {
        origin: req.origin.clone(),
        waypoints: req.waypoints.clone(),
        start_time,
        mode,
    });

    let sessions = (0..restarts).map(|k| {
        let index = Arc::clone(&state.index);
        let search = Arc::clone(&state.search);
        let request = Arc::clone(&request);
        let mut tabu = (*state.tabu).clone();
        tabu.seed = tabu.seed.map(|seed| seed.wrapping_add(k as u64));
        tokio::task::spawn_blocking(move || plan_tour(&index, &search, &tabu, &request))
    });

    let mut best: Option<TourPlan> = None;
    let mut first_error: Option<SearchError> = None;
    for joined in join_all(sessions).await {
        let outcome = joined.map_err(|e| AppError::Internal {
            message: format!("sequencing task failed: {e}"),
        })?;
        match outcome {
            Ok(plan) => {
                if best.as_ref().is_none_or(|b| plan.cost < b.cost) {
                    best = Some(plan);
                }
            }
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }

    let plan = match (best, first_error) {
        (Some(plan), _) => plan,
        (None, Some(e)) => return Err(e.into()),
        (None, None) => {
            return Err(AppError::Internal {
                message: "no sequencing run finished".to_string(),
            });
        }
    };

    Ok(Json(TourResponse::from_plan(&state.index, &req, &plan, mode, restarts)).into_response())
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Internal { message: String },
}

impl From<SearchError> for AppError {
    fn from(e: SearchError) -> Self {
        match e {
            SearchError::InvalidStop(_)
            | SearchError::InvalidMode(_)
            | SearchError::InvalidRequest(_) => AppError::BadRequest {
                message: e.to_string(),
            },
            SearchError::NotFound { .. } => AppError::NotFound {
                message: e.to_string(),
            },
            SearchError::ExpansionLimit { .. } => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl From<InvalidMode> for AppError {
    fn from(e: InvalidMode) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl From<TimeError> for AppError {
    fn from(e: TimeError) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        warn!(status = %status, error = %message, "request failed");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheConfig;
    use crate::network::AdjacencyIndexBuilder;
    use crate::planner::SearchConfig;
    use crate::sequencer::TabuConfig;

    fn time(s: &str) -> TransitTime {
        TransitTime::parse_hhmmss(s).unwrap()
    }

    fn state() -> AppState {
        let mut b = AdjacencyIndexBuilder::new();
        b.add_trip("1", "Plac", "Most", time("08:00:00"), time("08:10:00"))
            .unwrap();
        b.add_trip("1", "Most", "Plac", time("08:30:00"), time("08:40:00"))
            .unwrap();
        b.add_trip("2", "Most", "Park", time("08:15:00"), time("08:20:00"))
            .unwrap();
        b.add_trip("2", "Park", "Most", time("08:22:00"), time("08:27:00"))
            .unwrap();
        b.stop("Pustkowie");
        AppState::new(
            b.build(),
            SearchConfig::default(),
            TabuConfig::default().with_outer_steps(3).with_seed(1),
            &CacheConfig::default(),
        )
    }

    fn body(json: &str) -> Bytes {
        Bytes::from(json.to_string())
    }

    #[tokio::test]
    async fn route_is_planned_and_cached() {
        let state = state();
        let json = r#"{"origin":"Plac","destination":"Park","start_time":"07:55:00"}"#;

        let response = plan_route(State(state.clone()), body(json)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let plac = state.index.stop_id("Plac").unwrap();
        let park = state.index.stop_id("Park").unwrap();
        let cached = state
            .responses
            .get(&(plac, park, time("07:55:00"), CostMode::Time))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cached.arrival(), time("08:20:00"));
    }

    #[tokio::test]
    async fn unknown_stop_is_bad_request() {
        let json = r#"{"origin":"Plac","destination":"Atlantyda","start_time":"07:55:00"}"#;
        let err = plan_route(State(state()), body(json)).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn bad_mode_and_time_are_bad_requests() {
        let json = r#"{"origin":"Plac","destination":"Park","start_time":"07:55:00","mode":"FASTEST"}"#;
        let err = plan_route(State(state()), body(json)).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);

        let json = r#"{"origin":"Plac","destination":"Park","start_time":"7:55"}"#;
        let err = plan_route(State(state()), body(json)).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unreachable_stop_is_not_found() {
        let json = r#"{"origin":"Plac","destination":"Pustkowie","start_time":"07:55:00"}"#;
        let err = plan_route(State(state()), body(json)).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn tour_runs_restarts() {
        let json = r#"{"origin":"Plac","waypoints":["Park","Most"],"start_time":"07:55:00","mode":"transfers","restarts":3}"#;
        let response = plan_round_trip(State(state()), body(json)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn tour_with_unreachable_waypoint_is_not_found() {
        let json = r#"{"origin":"Plac","waypoints":["Park","Pustkowie"],"start_time":"07:55:00"}"#;
        let err = plan_round_trip(State(state()), body(json)).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn search_errors_map_to_statuses() {
        let cases = [
            (SearchError::InvalidStop("X".into()), StatusCode::BAD_REQUEST),
            (
                SearchError::NotFound {
                    origin: "A".into(),
                    destination: "B".into(),
                },
                StatusCode::NOT_FOUND,
            ),
            (
                SearchError::ExpansionLimit { limit: 1 },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, status) in cases {
            assert_eq!(AppError::from(error).into_response().status(), status);
        }
    }
}
