use std::net::SocketAddr;
use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use transit_planner::cache::CacheConfig;
use transit_planner::network::{LoadError, load_schedule_csv};
use transit_planner::planner::SearchConfig;
use transit_planner::sequencer::TabuConfig;
use transit_planner::web::{AppState, create_router};

/// Address used when `BIND_ADDR` is not set.
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Error starting the server.
#[derive(Debug, thiserror::Error)]
enum StartupError {
    /// No schedule path configured
    #[error("SCHEDULE_CSV is not set")]
    MissingSchedule,

    /// Schedule could not be loaded
    #[error("failed to load schedule: {0}")]
    Load(#[from] LoadError),

    /// Bind address could not be parsed
    #[error("invalid BIND_ADDR {addr:?}: {source}")]
    InvalidAddr {
        addr: String,
        source: std::net::AddrParseError,
    },

    /// Socket or server failure
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .init();
}

async fn run() -> Result<(), StartupError> {
    let schedule = std::env::var("SCHEDULE_CSV").map_err(|_| StartupError::MissingSchedule)?;
    let bind = std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
    let addr: SocketAddr = bind
        .parse()
        .map_err(|source| StartupError::InvalidAddr { addr: bind, source })?;

    let index = load_schedule_csv(&schedule)?;

    let state = AppState::new(
        index,
        SearchConfig::default(),
        TabuConfig::default(),
        &CacheConfig::default(),
    );
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "transit planner listening");
    info!("  GET  /health            - Health check");
    info!("  GET  /api/stops/search  - Search stops by name");
    info!("  POST /route             - Plan a route between two stops");
    info!("  POST /tour              - Plan a round trip through waypoints");

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
