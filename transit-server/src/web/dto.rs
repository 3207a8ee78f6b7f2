//! Data transfer objects for web requests and responses.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::{Foot, IntermediateStop, Journey, Leg, Stop, Transport, Vehicle, format_hhmm};
use crate::profile::Criteria;

/// Request to plan journeys between two stations.
#[derive(Debug, Deserialize)]
pub struct JourneysRequest {
    /// Departure station id or name
    pub from: String,

    /// Arrival station id or name
    pub to: String,

    /// Service date, `YYYY-MM-DD` (defaults to today)
    pub date: Option<String>,

    /// Earliest departure, `HH:MM`
    pub after: Option<String>,
}

/// Request for one station's frontier.
#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    /// Destination station id or name
    pub to: String,

    /// Service date, `YYYY-MM-DD` (defaults to today)
    pub date: Option<String>,

    /// Departure station id or name
    pub station: String,
}

/// A station in listings.
#[derive(Debug, Serialize, PartialEq)]
pub struct StationResult {
    pub id: usize,
    pub name: String,
    pub longitude: f64,
    pub latitude: f64,
}

/// Response for the station listing.
#[derive(Debug, Serialize)]
pub struct StationsResponse {
    pub stations: Vec<StationResult>,
}

/// A journey option.
#[derive(Debug, Serialize)]
pub struct JourneyResult {
    /// Journey legs
    pub legs: Vec<LegResult>,

    /// Departure time from origin
    pub departure_time: String,

    /// Arrival time at destination
    pub arrival_time: String,

    /// Total duration in minutes
    pub duration_mins: i64,

    /// Number of changes
    pub changes: usize,
}

/// A leg of a journey.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LegResult {
    Transport(TransportResult),
    Foot(FootResult),
}

/// A ride on one vehicle.
#[derive(Debug, Serialize)]
pub struct TransportResult {
    pub vehicle: Vehicle,

    /// Route name
    pub route: String,

    /// Destination shown on the vehicle
    pub destination: String,

    /// Boarding stop
    pub origin: StopInfo,

    /// Alighting stop
    pub arrival: StopInfo,

    /// Intermediate stops
    pub stops: Vec<StopInfo>,
}

/// A walk, or a change within a station.
#[derive(Debug, Serialize)]
pub struct FootResult {
    pub from: StopInfo,
    pub to: StopInfo,

    /// Duration in minutes
    pub duration_mins: i64,

    /// True for a change within one station
    pub is_transfer: bool,
}

/// Stop information for display.
#[derive(Debug, Serialize)]
pub struct StopInfo {
    /// Station name
    pub name: String,

    /// Platform
    pub platform: Option<String>,

    /// Time at this stop
    pub time: String,

    /// Departure from an intermediate stop, when it differs from `time`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departure: Option<String>,

    pub longitude: f64,
    pub latitude: f64,
}

/// Response for journey planning.
#[derive(Debug, Serialize)]
pub struct JourneysResponse {
    /// Journey options by departure time
    pub journeys: Vec<JourneyResult>,
}

/// One frontier member.
#[derive(Debug, Serialize, PartialEq)]
pub struct CriterionResult {
    pub dep: Option<String>,
    pub arr: String,
    pub changes: u32,
}

/// Response for a station's frontier.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub station: usize,
    pub destination: usize,
    pub date: String,
    pub criteria: Vec<CriterionResult>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

// Conversion implementations

impl JourneyResult {
    /// Create from a domain Journey.
    pub fn from_journey(journey: &Journey) -> Self {
        let legs = journey
            .legs()
            .iter()
            .map(|leg| match leg {
                Leg::Transport(t) => LegResult::Transport(TransportResult::from_transport(leg, t)),
                Leg::Foot(f) => LegResult::Foot(FootResult::from_foot(leg, f)),
            })
            .collect();

        Self {
            legs,
            departure_time: format_time(&journey.dep_time()),
            arrival_time: format_time(&journey.arr_time()),
            duration_mins: journey.duration().num_minutes(),
            changes: journey.change_count(),
        }
    }
}

impl TransportResult {
    fn from_transport(leg: &Leg, transport: &Transport) -> Self {
        Self {
            vehicle: transport.vehicle(),
            route: transport.route().to_string(),
            destination: transport.destination().to_string(),
            origin: StopInfo::new(leg.dep_stop(), &leg.dep_time()),
            arrival: StopInfo::new(leg.arr_stop(), &leg.arr_time()),
            stops: transport
                .intermediate_stops()
                .iter()
                .map(StopInfo::from_intermediate)
                .collect(),
        }
    }
}

impl FootResult {
    fn from_foot(leg: &Leg, foot: &Foot) -> Self {
        Self {
            from: StopInfo::new(leg.dep_stop(), &leg.dep_time()),
            to: StopInfo::new(leg.arr_stop(), &leg.arr_time()),
            duration_mins: leg.duration().num_minutes(),
            is_transfer: foot.is_transfer(),
        }
    }
}

impl StopInfo {
    fn new(stop: &Stop, time: &NaiveDateTime) -> Self {
        Self {
            name: stop.name().to_string(),
            platform: stop.platform_name().map(str::to_string),
            time: format_time(time),
            departure: None,
            longitude: stop.longitude(),
            latitude: stop.latitude(),
        }
    }

    fn from_intermediate(stop: &IntermediateStop) -> Self {
        let mut info = Self::new(stop.stop(), &stop.arr_time());
        if stop.dep_time() != stop.arr_time() {
            info.departure = Some(format_time(&stop.dep_time()));
        }
        info
    }
}

impl CriterionResult {
    pub fn from_criteria(c: &Criteria) -> Self {
        Self {
            dep: c.dep_mins().map(format_hhmm),
            arr: format_hhmm(c.arr_mins()),
            changes: c.changes(),
        }
    }
}

/// Format a time as HH:MM.
fn format_time(t: &NaiveDateTime) -> String {
    t.format("%H:%M").to_string()
}
