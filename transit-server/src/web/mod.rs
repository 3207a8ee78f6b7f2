//! Web layer for the journey planner.
//!
//! Provides HTTP endpoints for listing stations, planning journeys and
//! inspecting profiles.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
