//! Read-only timetable contracts consumed by the router and the extractor.
//!
//! Every collection is addressed by a dense index `0..len()`. Accessors
//! panic on out-of-range indices, like slice indexing; callers that decode
//! indices from untrusted data check them against `len()` first.
//!
//! Stop ids cover both stations and platforms: ids `0..stations().len()` are
//! stations, the following `platforms().len()` ids are platforms. Transfers
//! and criteria are station-granular, connections are stop-granular.

mod error;
pub mod memory;

use chrono::NaiveDate;

use crate::bits::PackedRange;
use crate::domain::Vehicle;

pub use error::TimetableError;
pub use memory::{MemoryTimeTable, TimetableDocument};

/// Stations: name and position.
pub trait Stations {
    /// Number of stations.
    fn len(&self) -> usize;

    /// Returns true if there are no stations.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn name(&self, id: usize) -> &str;
    fn longitude(&self, id: usize) -> f64;
    fn latitude(&self, id: usize) -> f64;
}

/// Platforms (tracks, quays) belonging to a station.
pub trait Platforms {
    /// Number of platforms.
    fn len(&self) -> usize;

    /// Returns true if there are no platforms.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Platform label, e.g. `"3"` or `"A"`.
    fn name(&self, id: usize) -> &str;

    /// Owning station.
    fn station_id(&self, id: usize) -> usize;
}

/// Public transport routes.
pub trait Routes {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn vehicle(&self, id: usize) -> Vehicle;
    fn name(&self, id: usize) -> &str;
}

/// Walking transfers between stations, grouped by arrival station.
pub trait Transfers {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Station the transfer leaves from.
    fn dep_station_id(&self, id: usize) -> usize;

    /// Walking time in minutes.
    fn minutes(&self, id: usize) -> u32;

    /// Indices of every transfer arriving at `station_id`.
    fn arriving_at(&self, station_id: usize) -> PackedRange;

    /// Walking time from `dep_station_id` to `arr_station_id`.
    ///
    /// # Errors
    ///
    /// Returns [`TimetableError::TransferNotFound`] if no such transfer exists.
    fn minutes_between(
        &self,
        dep_station_id: usize,
        arr_station_id: usize,
    ) -> Result<u32, TimetableError>;
}

/// Trips running on one service date.
pub trait Trips {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn route_id(&self, id: usize) -> usize;

    /// Destination shown on the vehicle.
    fn destination(&self, id: usize) -> &str;
}

/// Vehicle connections running on one service date.
///
/// Connections are ordered by descending departure time: for any two
/// indices `i < j`, `dep_mins(i) >= dep_mins(j)`. Within a trip, a later
/// connection always comes before an earlier one.
pub trait Connections {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn dep_stop_id(&self, id: usize) -> usize;
    fn dep_mins(&self, id: usize) -> i32;
    fn arr_stop_id(&self, id: usize) -> usize;
    fn arr_mins(&self, id: usize) -> i32;
    fn trip_id(&self, id: usize) -> usize;

    /// Position of the connection within its trip, starting at 0.
    fn trip_pos(&self, id: usize) -> u32;

    /// Next connection of the same trip. The last connection of a trip links
    /// back to the trip's first connection.
    fn next_connection_id(&self, id: usize) -> usize;
}

/// A complete timetable: static network data plus per-date services.
pub trait TimeTable {
    type Stations: Stations;
    type Platforms: Platforms;
    type Routes: Routes;
    type Transfers: Transfers;
    type Trips: Trips;
    type Connections: Connections;

    fn stations(&self) -> &Self::Stations;
    fn platforms(&self) -> &Self::Platforms;
    fn routes(&self) -> &Self::Routes;
    fn transfers(&self) -> &Self::Transfers;

    /// Trips running on `date`.
    fn trips_for(&self, date: NaiveDate) -> Result<&Self::Trips, TimetableError>;

    /// Connections running on `date`.
    fn connections_for(&self, date: NaiveDate) -> Result<&Self::Connections, TimetableError>;

    /// Returns true if `stop_id` designates a station.
    fn is_station_id(&self, stop_id: usize) -> bool {
        stop_id < self.stations().len()
    }

    /// Returns true if `stop_id` designates a platform.
    fn is_platform_id(&self, stop_id: usize) -> bool {
        let stations = self.stations().len();
        stop_id >= stations && stop_id - stations < self.platforms().len()
    }

    /// Station owning `stop_id`.
    fn station_id(&self, stop_id: usize) -> usize {
        if self.is_station_id(stop_id) {
            stop_id
        } else {
            self.platforms()
                .station_id(stop_id - self.stations().len())
        }
    }

    /// Platform label of `stop_id`, or `None` for a station.
    fn platform_name(&self, stop_id: usize) -> Option<&str> {
        if self.is_platform_id(stop_id) {
            Some(self.platforms().name(stop_id - self.stations().len()))
        } else {
            None
        }
    }
}
