//! Journey legs.
//!
//! A journey alternates between [`Transport`] legs (riding one vehicle from
//! boarding to alighting) and [`Foot`] legs (walking between stops, or
//! changing platform within a station).

use std::fmt;

use chrono::{Duration, NaiveDateTime};

use super::{DomainError, Stop, Vehicle};

fn hhmm(t: &NaiveDateTime) -> String {
    t.format("%H:%M").to_string()
}

/// A stop where the vehicle halts between boarding and alighting.
#[derive(Debug, Clone, PartialEq)]
pub struct IntermediateStop {
    stop: Stop,
    arr_time: NaiveDateTime,
    dep_time: NaiveDateTime,
}

impl IntermediateStop {
    /// Creates an intermediate stop.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the vehicle would leave before it arrives.
    pub fn new(
        stop: Stop,
        arr_time: NaiveDateTime,
        dep_time: NaiveDateTime,
    ) -> Result<Self, DomainError> {
        if dep_time < arr_time {
            return Err(DomainError::InvalidLeg(
                "intermediate stop departs before it arrives",
            ));
        }
        Ok(Self {
            stop,
            arr_time,
            dep_time,
        })
    }

    pub fn stop(&self) -> &Stop {
        &self.stop
    }

    pub fn arr_time(&self) -> NaiveDateTime {
        self.arr_time
    }

    pub fn dep_time(&self) -> NaiveDateTime {
        self.dep_time
    }
}

/// What a transport leg rides on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Kind of vehicle
    pub vehicle: Vehicle,
    /// Route name, e.g. "IR 15"
    pub route: String,
    /// Destination shown on the vehicle
    pub destination: String,
}

/// A ride on one vehicle.
///
/// # Invariants
///
/// - `arr_time >= dep_time`
/// - Intermediate stops lie within `[dep_time, arr_time]`, in order
#[derive(Debug, Clone, PartialEq)]
pub struct Transport {
    dep_stop: Stop,
    dep_time: NaiveDateTime,
    arr_stop: Stop,
    arr_time: NaiveDateTime,
    intermediate_stops: Vec<IntermediateStop>,
    line: Line,
}

impl Transport {
    /// Constructs a transport leg, validating its times.
    ///
    /// # Errors
    ///
    /// Returns `Err` if it arrives before it departs, or if an intermediate
    /// stop falls outside the ride or out of order.
    pub fn new(
        dep_stop: Stop,
        dep_time: NaiveDateTime,
        arr_stop: Stop,
        arr_time: NaiveDateTime,
        intermediate_stops: Vec<IntermediateStop>,
        line: Line,
    ) -> Result<Self, DomainError> {
        if arr_time < dep_time {
            return Err(DomainError::InvalidLeg("arrival before departure"));
        }
        let mut previous = dep_time;
        for stop in &intermediate_stops {
            if stop.arr_time < previous {
                return Err(DomainError::InvalidLeg("intermediate stops out of order"));
            }
            previous = stop.dep_time;
        }
        if arr_time < previous {
            return Err(DomainError::InvalidLeg("intermediate stop after arrival"));
        }

        Ok(Self {
            dep_stop,
            dep_time,
            arr_stop,
            arr_time,
            intermediate_stops,
            line,
        })
    }

    pub fn line(&self) -> &Line {
        &self.line
    }

    pub fn vehicle(&self) -> Vehicle {
        self.line.vehicle
    }

    pub fn route(&self) -> &str {
        &self.line.route
    }

    pub fn destination(&self) -> &str {
        &self.line.destination
    }

    pub fn intermediate_stops(&self) -> &[IntermediateStop] {
        &self.intermediate_stops
    }
}

/// A walk between two stops.
#[derive(Debug, Clone, PartialEq)]
pub struct Foot {
    dep_stop: Stop,
    dep_time: NaiveDateTime,
    arr_stop: Stop,
    arr_time: NaiveDateTime,
}

impl Foot {
    /// Constructs a foot leg.
    ///
    /// # Errors
    ///
    /// Returns `Err` if it arrives before it departs.
    pub fn new(
        dep_stop: Stop,
        dep_time: NaiveDateTime,
        arr_stop: Stop,
        arr_time: NaiveDateTime,
    ) -> Result<Self, DomainError> {
        if arr_time < dep_time {
            return Err(DomainError::InvalidLeg("arrival before departure"));
        }
        Ok(Self {
            dep_stop,
            dep_time,
            arr_stop,
            arr_time,
        })
    }

    /// Returns true for a change within one station (same stop name), as
    /// opposed to a walk between stations.
    pub fn is_transfer(&self) -> bool {
        self.dep_stop.name() == self.arr_stop.name()
    }
}

/// One leg of a journey.
#[derive(Debug, Clone, PartialEq)]
pub enum Leg {
    Transport(Transport),
    Foot(Foot),
}

impl Leg {
    pub fn dep_stop(&self) -> &Stop {
        match self {
            Leg::Transport(t) => &t.dep_stop,
            Leg::Foot(f) => &f.dep_stop,
        }
    }

    pub fn dep_time(&self) -> NaiveDateTime {
        match self {
            Leg::Transport(t) => t.dep_time,
            Leg::Foot(f) => f.dep_time,
        }
    }

    pub fn arr_stop(&self) -> &Stop {
        match self {
            Leg::Transport(t) => &t.arr_stop,
            Leg::Foot(f) => &f.arr_stop,
        }
    }

    pub fn arr_time(&self) -> NaiveDateTime {
        match self {
            Leg::Transport(t) => t.arr_time,
            Leg::Foot(f) => f.arr_time,
        }
    }

    /// Time between departure and arrival.
    pub fn duration(&self) -> Duration {
        self.arr_time() - self.dep_time()
    }

    /// Intermediate stops; always empty for a foot leg.
    pub fn intermediate_stops(&self) -> &[IntermediateStop] {
        match self {
            Leg::Transport(t) => &t.intermediate_stops,
            Leg::Foot(_) => &[],
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Leg::Transport(_))
    }

    pub fn is_foot(&self) -> bool {
        matches!(self, Leg::Foot(_))
    }

    pub fn as_transport(&self) -> Option<&Transport> {
        match self {
            Leg::Transport(t) => Some(t),
            Leg::Foot(_) => None,
        }
    }

    pub fn as_foot(&self) -> Option<&Foot> {
        match self {
            Leg::Transport(_) => None,
            Leg::Foot(f) => Some(f),
        }
    }
}

impl fmt::Display for Leg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Leg::Transport(t) => write!(
                f,
                "{} {} → {} (arr {}) {} {} towards {}",
                hhmm(&t.dep_time),
                t.dep_stop,
                t.arr_stop,
                hhmm(&t.arr_time),
                t.line.vehicle,
                t.line.route,
                t.line.destination,
            ),
            Leg::Foot(foot) => {
                let minutes = (foot.arr_time - foot.dep_time).num_minutes();
                let kind = if foot.is_transfer() { "change" } else { "walk" };
                write!(
                    f,
                    "{kind} {} → {} ({minutes} min)",
                    foot.dep_stop, foot.arr_stop
                )
            }
        }
    }
}
