//! Pareto profiles and the connection-scan router that builds them.
//!
//! A [`Profile`] holds, for one service date and one destination station, the
//! Pareto frontier of every station: each member says "leave at `dep`, reach
//! the destination at `arr` with `changes` changes", and its payload tells
//! [`journeys`] which connection to board.

mod criteria;
mod extractor;
mod pareto;
mod router;

use std::sync::Arc;

use chrono::NaiveDate;

use crate::timetable::{Stations, TimeTable, TimetableError, Trips};

pub use criteria::{Criteria, CriteriaError, MAX_CHANGES, MAX_MINS, MIN_MINS};
pub use extractor::journeys;
pub use pareto::{ParetoFront, ParetoFrontBuilder};
pub use router::{Router, RouterError};

/// Errors from profile access.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    /// Station id outside `0..len`
    #[error("station {id} out of range (0..{len})")]
    StationOutOfRange { id: usize, len: usize },

    /// Trip id outside `0..len`
    #[error("trip {id} out of range (0..{len})")]
    TripOutOfRange { id: usize, len: usize },

    /// The timetable has no service for the profile's date
    #[error(transparent)]
    Timetable(#[from] TimetableError),
}

/// Optimal journeys from every station to one destination, on one date.
///
/// Immutable once built; stations the scan never reached hold the empty
/// frontier.
pub struct Profile<T> {
    timetable: Arc<T>,
    date: NaiveDate,
    arr_station_id: usize,
    fronts: Box<[ParetoFront]>,
}

impl<T: TimeTable> Profile<T> {
    pub fn timetable(&self) -> &T {
        &self.timetable
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Destination station.
    pub fn arr_station_id(&self) -> usize {
        self.arr_station_id
    }

    /// Frontier of journeys leaving `station_id`.
    pub fn for_station(&self, station_id: usize) -> Result<&ParetoFront, ProfileError> {
        self.fronts
            .get(station_id)
            .ok_or(ProfileError::StationOutOfRange {
                id: station_id,
                len: self.fronts.len(),
            })
    }

    /// Number of stations with at least one journey.
    pub fn reachable_count(&self) -> usize {
        self.fronts.iter().filter(|f| !f.is_empty()).count()
    }
}

impl<T> std::fmt::Debug for Profile<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Profile")
            .field("date", &self.date)
            .field("arr_station_id", &self.arr_station_id)
            .field("stations", &self.fronts.len())
            .finish()
    }
}

/// Mutable state of a profile under construction.
///
/// Holds one frontier builder per station, plus one per trip of the date
/// used as scratch space by the router.
pub struct ProfileBuilder<T> {
    timetable: Arc<T>,
    date: NaiveDate,
    arr_station_id: usize,
    stations: Vec<ParetoFrontBuilder>,
    trips: Vec<ParetoFrontBuilder>,
}

impl<T: TimeTable> ProfileBuilder<T> {
    /// Allocates empty frontiers for every station and every trip of `date`.
    ///
    /// # Errors
    ///
    /// Fails if the timetable has no service on `date`.
    pub fn new(
        timetable: Arc<T>,
        date: NaiveDate,
        arr_station_id: usize,
    ) -> Result<Self, ProfileError> {
        let station_count = timetable.stations().len();
        let trip_count = timetable.trips_for(date)?.len();
        Ok(Self {
            timetable,
            date,
            arr_station_id,
            stations: vec![ParetoFrontBuilder::new(); station_count],
            trips: vec![ParetoFrontBuilder::new(); trip_count],
        })
    }

    pub fn for_station(&self, station_id: usize) -> Result<&ParetoFrontBuilder, ProfileError> {
        let len = self.stations.len();
        self.stations
            .get(station_id)
            .ok_or(ProfileError::StationOutOfRange { id: station_id, len })
    }

    pub fn set_for_station(
        &mut self,
        station_id: usize,
        builder: ParetoFrontBuilder,
    ) -> Result<(), ProfileError> {
        let len = self.stations.len();
        let slot = self
            .stations
            .get_mut(station_id)
            .ok_or(ProfileError::StationOutOfRange { id: station_id, len })?;
        *slot = builder;
        Ok(())
    }

    pub fn for_trip(&self, trip_id: usize) -> Result<&ParetoFrontBuilder, ProfileError> {
        let len = self.trips.len();
        self.trips
            .get(trip_id)
            .ok_or(ProfileError::TripOutOfRange { id: trip_id, len })
    }

    pub fn set_for_trip(
        &mut self,
        trip_id: usize,
        builder: ParetoFrontBuilder,
    ) -> Result<(), ProfileError> {
        let len = self.trips.len();
        let slot = self
            .trips
            .get_mut(trip_id)
            .ok_or(ProfileError::TripOutOfRange { id: trip_id, len })?;
        *slot = builder;
        Ok(())
    }

    pub(crate) fn station_mut(
        &mut self,
        station_id: usize,
    ) -> Result<&mut ParetoFrontBuilder, ProfileError> {
        let len = self.stations.len();
        self.stations
            .get_mut(station_id)
            .ok_or(ProfileError::StationOutOfRange { id: station_id, len })
    }

    pub(crate) fn trip_mut(
        &mut self,
        trip_id: usize,
    ) -> Result<&mut ParetoFrontBuilder, ProfileError> {
        let len = self.trips.len();
        self.trips
            .get_mut(trip_id)
            .ok_or(ProfileError::TripOutOfRange { id: trip_id, len })
    }

    /// Freezes every station frontier. Trip scratch frontiers are dropped.
    pub fn build(self) -> Profile<T> {
        Profile {
            timetable: self.timetable,
            date: self.date,
            arr_station_id: self.arr_station_id,
            fronts: self
                .stations
                .into_iter()
                .map(ParetoFrontBuilder::into_front)
                .collect(),
        }
    }
}
