use std::process::ExitCode;

use chrono::Local;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use transit_server::config::ServerConfig;
use transit_server::timetable::{MemoryTimeTable, Stations, TimeTable};
use transit_server::web::{AppState, create_router};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Server stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env()?;
    let timetable = MemoryTimeTable::from_path(&config.timetable_path)?;

    // Resolve prefetch destinations before the timetable moves into the state
    let mut destinations = Vec::new();
    for query in &config.prefetch_destinations {
        match timetable.find_station(query) {
            Some(id) => destinations.push(id),
            None => warn!(station = %query, "Unknown prefetch destination"),
        }
    }
    info!(
        stations = timetable.stations().len(),
        dates = timetable.dates().count(),
        "Timetable ready"
    );

    let state = AppState::new(timetable, &config.cache);

    // Warm today's profiles in the background
    if !destinations.is_empty() {
        let warm = state.clone();
        tokio::spawn(async move {
            let today = Local::now().date_naive();
            if warm.timetable.connections_for(today).is_err() {
                warn!(%today, "No service today, skipping prefetch");
                return;
            }
            let cached = warm
                .profiles
                .prefetch(&warm.router, today, &destinations)
                .await;
            info!(%today, cached, "Prefetched profiles");
        });
    }

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "Journey planner listening");
    info!("API Endpoints:");
    info!("  GET /health                            - Health check");
    info!("  GET /stations                          - List stations");
    info!("  GET /journeys?from=&to=&date=&after=   - Plan journeys");
    info!("  GET /profile?to=&date=&station=        - Inspect a station's profile");

    axum::serve(listener, app).await?;
    Ok(())
}
