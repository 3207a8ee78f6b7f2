//! Journey reconstruction from a profile.
//!
//! Each criterion of the departure station's frontier names the connection
//! to board and how many stops to stay on board. After alighting, the
//! arrival station's frontier holds the criterion with the same arrival and
//! one change less, which names the next connection, and so on.

use chrono::NaiveDateTime;
use tracing::{debug, warn};

use super::{Criteria, Profile, ProfileError};
use crate::bits::Bits24x8;
use crate::domain::{
    DomainError, Foot, IntermediateStop, Journey, Leg, Line, Stop, Transport, datetime_at,
};
use crate::timetable::{Connections, Routes, Stations, TimeTable, TimetableError, Transfers, Trips};

/// Why one candidate journey could not be rebuilt.
#[derive(Debug, thiserror::Error)]
enum ExtractError {
    #[error("connection {0} out of range")]
    InvalidConnection(usize),

    #[error("criterion has no departure time")]
    NoDeparture,

    #[error(transparent)]
    Timetable(#[from] TimetableError),

    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Rebuilds one journey per criterion of `dep_station_id`'s frontier, sorted
/// by departure then arrival.
///
/// Candidates that cannot be rebuilt are logged and skipped. When the chain
/// of criteria breaks after at least one ride, the journey built so far is
/// kept.
///
/// # Errors
///
/// Fails if `dep_station_id` is not a station of the profile, or if the
/// timetable has no service on the profile's date.
pub fn journeys<T: TimeTable>(
    profile: &Profile<T>,
    dep_station_id: usize,
) -> Result<Vec<Journey>, ProfileError> {
    let front = profile.for_station(dep_station_id)?;
    let tt = profile.timetable();
    let connections = tt.connections_for(profile.date())?;
    let trips = tt.trips_for(profile.date())?;
    let extractor = Extractor {
        profile,
        connections,
        trips,
    };

    let mut journeys: Vec<Journey> = front
        .iter()
        .filter_map(|crit| match extractor.journey(dep_station_id, *crit) {
            Ok(journey) => Some(journey),
            Err(e) => {
                warn!(criterion = %crit, error = %e, "Dropping journey candidate");
                None
            }
        })
        .collect();

    journeys.sort_by_key(|j| (j.dep_time(), j.arr_time()));
    Ok(journeys)
}

struct Extractor<'a, T: TimeTable> {
    profile: &'a Profile<T>,
    connections: &'a T::Connections,
    trips: &'a T::Trips,
}

impl<T: TimeTable> Extractor<'_, T> {
    fn journey(&self, dep_station_id: usize, crit: Criteria) -> Result<Journey, ExtractError> {
        let tt = self.profile.timetable();
        let conns = self.connections;
        let dest = self.profile.arr_station_id();
        let target_arr = crit.arr_mins();
        let dep_mins = crit.dep_mins().ok_or(ExtractError::NoDeparture)?;

        let mut legs = Vec::new();
        let mut conn = self.connection(crit)?;
        let mut stops = Bits24x8::unpack8(crit.payload());
        let mut changes = crit.changes();

        if conns.dep_stop_id(conn) != dep_station_id {
            legs.push(Leg::Foot(Foot::new(
                self.stop(dep_station_id)?,
                self.at(dep_mins),
                self.stop(conns.dep_stop_id(conn))?,
                self.at(conns.dep_mins(conn)),
            )?));
        }

        let (complete, arr_stop, arr_mins) = loop {
            let (leg, last) = self.transport_leg(conn, stops)?;
            legs.push(leg);

            let arr_stop = conns.arr_stop_id(last);
            let arr_mins = conns.arr_mins(last);
            if changes == 0 {
                break (true, arr_stop, arr_mins);
            }

            let arr_station = tt.station_id(arr_stop);
            let Some(next) = self
                .profile
                .for_station(arr_station)?
                .get(target_arr, changes - 1)
            else {
                debug!(station = arr_station, target_arr, changes, "No continuation");
                break (false, arr_stop, arr_mins);
            };
            let Ok(next_conn) = self.connection(next) else {
                debug!(criterion = %next, "Continuation names an unknown connection");
                break (false, arr_stop, arr_mins);
            };

            let board_stop = conns.dep_stop_id(next_conn);
            let walk = tt
                .transfers()
                .minutes_between(arr_station, tt.station_id(board_stop))?;
            legs.push(Leg::Foot(Foot::new(
                self.stop(arr_stop)?,
                self.at(arr_mins),
                self.stop(board_stop)?,
                self.at(arr_mins + walk as i32),
            )?));

            conn = next_conn;
            stops = Bits24x8::unpack8(next.payload());
            changes -= 1;
        };

        // A truncated journey only gets a final walk if one exists
        let arr_station = tt.station_id(arr_stop);
        if arr_station != dest {
            match tt.transfers().minutes_between(arr_station, dest) {
                Ok(walk) => legs.push(Leg::Foot(Foot::new(
                    self.stop(arr_stop)?,
                    self.at(arr_mins),
                    self.stop(dest)?,
                    self.at(arr_mins + walk as i32),
                )?)),
                Err(e) if complete => return Err(e.into()),
                Err(_) => {}
            }
        }

        Ok(Journey::new(legs)?)
    }

    /// Boarding connection named by a criterion's payload.
    fn connection(&self, crit: Criteria) -> Result<usize, ExtractError> {
        let id = Bits24x8::unpack24(crit.payload()) as usize;
        if id < self.connections.len() {
            Ok(id)
        } else {
            Err(ExtractError::InvalidConnection(id))
        }
    }

    /// Rides from `first` past `stops` intermediate stops. Returns the leg and
    /// the last connection ridden.
    fn transport_leg(&self, first: usize, stops: u32) -> Result<(Leg, usize), ExtractError> {
        let tt = self.profile.timetable();
        let conns = self.connections;

        let mut intermediate = Vec::with_capacity(stops as usize);
        let mut last = first;
        for _ in 0..stops {
            let next = conns.next_connection_id(last);
            if next >= conns.len() {
                return Err(ExtractError::InvalidConnection(next));
            }
            let (mut arr, mut dep) = (conns.arr_mins(last), conns.dep_mins(next));
            if arr > dep {
                std::mem::swap(&mut arr, &mut dep);
            }
            intermediate.push(IntermediateStop::new(
                self.stop(conns.arr_stop_id(last))?,
                self.at(arr),
                self.at(dep),
            )?);
            last = next;
        }

        let trip = conns.trip_id(first);
        let route = self.trips.route_id(trip);
        let line = Line {
            vehicle: tt.routes().vehicle(route),
            route: tt.routes().name(route).to_owned(),
            destination: self.trips.destination(trip).to_owned(),
        };
        let leg = Transport::new(
            self.stop(conns.dep_stop_id(first))?,
            self.at(conns.dep_mins(first)),
            self.stop(conns.arr_stop_id(last))?,
            self.at(conns.arr_mins(last)),
            intermediate,
            line,
        )?;
        Ok((Leg::Transport(leg), last))
    }

    fn stop(&self, stop_id: usize) -> Result<Stop, DomainError> {
        let tt = self.profile.timetable();
        let station = tt.station_id(stop_id);
        let stations = tt.stations();
        Stop::new(
            stations.name(station),
            tt.platform_name(stop_id),
            stations.longitude(station),
            stations.latitude(station),
        )
    }

    fn at(&self, mins: i32) -> NaiveDateTime {
        datetime_at(self.profile.date(), mins)
    }
}
