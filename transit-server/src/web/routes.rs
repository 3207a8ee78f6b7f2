//! HTTP route handlers.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::{Local, NaiveDate};
use tracing::{error, warn};

use crate::domain::{datetime_at, parse_hhmm};
use crate::profile::{ProfileError, RouterError, journeys};
use crate::timetable::{Stations, TimeTable, TimetableError};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/stations", get(list_stations))
        .route("/journeys", get(plan_journeys))
        .route("/profile", get(station_profile))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// List every station.
async fn list_stations(State(state): State<AppState>) -> Json<StationsResponse> {
    let table = state.timetable.stations();
    let stations = (0..table.len())
        .map(|id| StationResult {
            id,
            name: table.name(id).to_string(),
            longitude: table.longitude(id),
            latitude: table.latitude(id),
        })
        .collect();

    Json(StationsResponse { stations })
}

/// Plan journeys between two stations on one date.
async fn plan_journeys(
    State(state): State<AppState>,
    Query(req): Query<JourneysRequest>,
) -> Result<Json<JourneysResponse>, AppError> {
    let from = resolve_station(&state, &req.from)?;
    let to = resolve_station(&state, &req.to)?;
    let date = parse_date(req.date.as_deref())?;
    let after = req
        .after
        .as_deref()
        .map(|s| {
            parse_hhmm(s).map_err(|e| AppError::BadRequest {
                message: format!("Invalid time {s:?}: {e}"),
            })
        })
        .transpose()?
        .map(|mins| datetime_at(date, mins));

    let profile = state
        .profiles
        .get_or_compute(&state.router, date, to)
        .await?;

    let journeys = journeys(&*profile, from)?
        .iter()
        .filter(|j| after.is_none_or(|t| j.dep_time() >= t))
        .map(JourneyResult::from_journey)
        .collect();

    Ok(Json(JourneysResponse { journeys }))
}

/// Frontier of one station towards a destination.
async fn station_profile(
    State(state): State<AppState>,
    Query(req): Query<ProfileRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    let station = resolve_station(&state, &req.station)?;
    let to = resolve_station(&state, &req.to)?;
    let date = parse_date(req.date.as_deref())?;

    let profile = state
        .profiles
        .get_or_compute(&state.router, date, to)
        .await?;
    let criteria = profile
        .for_station(station)?
        .iter()
        .map(CriterionResult::from_criteria)
        .collect();

    Ok(Json(ProfileResponse {
        station,
        destination: to,
        date: date.to_string(),
        criteria,
    }))
}

/// Look up a station by id or name.
fn resolve_station(state: &AppState, query: &str) -> Result<usize, AppError> {
    state
        .timetable
        .find_station(query)
        .ok_or_else(|| AppError::NotFound {
            message: format!("Unknown station: {query}"),
        })
}

/// Parse a `YYYY-MM-DD` date, defaulting to today.
fn parse_date(date: Option<&str>) -> Result<NaiveDate, AppError> {
    match date {
        None => Ok(Local::now().date_naive()),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| AppError::BadRequest {
            message: format!("Invalid date: {s}"),
        }),
    }
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Internal { message: String },
}

impl From<Arc<RouterError>> for AppError {
    fn from(e: Arc<RouterError>) -> Self {
        match &*e {
            RouterError::UnknownStation(_)
            | RouterError::Timetable(TimetableError::NoServiceOn(_))
            | RouterError::Profile(ProfileError::Timetable(TimetableError::NoServiceOn(_))) => {
                AppError::NotFound {
                    message: e.to_string(),
                }
            }
            _ => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl From<ProfileError> for AppError {
    fn from(e: ProfileError) -> Self {
        match e {
            ProfileError::StationOutOfRange { .. }
            | ProfileError::Timetable(TimetableError::NoServiceOn(_)) => AppError::NotFound {
                message: e.to_string(),
            },
            _ => AppError::Internal {
                message: e.to_string(),
            },
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

        if status.is_server_error() {
            error!(%status, %message, "Request failed");
        } else {
            warn!(%status, %message, "Request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
