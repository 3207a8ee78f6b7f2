//! In-memory timetable loaded from a JSON document.
//!
//! The document lists stations, platforms, routes, walking transfers and,
//! per service date, the trips running that day as ordered stop calls:
//!
//! ```json
//! {
//!   "stations": [{ "name": "Lausanne", "longitude": 6.629, "latitude": 46.516 }],
//!   "platforms": [{ "name": "3", "station": 0 }],
//!   "routes": [{ "name": "IR 15", "vehicle": "train" }],
//!   "transfers": [{ "from": 0, "to": 1, "minutes": 5 }],
//!   "days": [{
//!     "date": "2025-03-18",
//!     "trips": [{ "route": 0, "destination": "Genève",
//!                 "calls": [{ "stop": 1, "dep": "08:00" }, { "stop": 2, "arr": "08:30" }] }]
//!   }]
//! }
//! ```
//!
//! Transfers are walkable both ways. Call stops use stop ids: station ids
//! first, then platform ids.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

use super::{
    Connections, Platforms, Routes, Stations, TimeTable, TimetableError, Transfers, Trips,
};
use crate::bits::PackedRange;
use crate::domain::{Stop, Vehicle, parse_hhmm};

/// Most calls a trip may have, so that trip positions fit in 8 bits.
pub const MAX_TRIP_CALLS: usize = 256;

/// Root of the JSON timetable document.
#[derive(Debug, Clone, Deserialize)]
pub struct TimetableDocument {
    pub stations: Vec<StationRecord>,
    #[serde(default)]
    pub platforms: Vec<PlatformRecord>,
    pub routes: Vec<RouteRecord>,
    #[serde(default)]
    pub transfers: Vec<TransferRecord>,
    pub days: Vec<DayRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StationRecord {
    pub name: String,
    pub longitude: f64,
    pub latitude: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlatformRecord {
    pub name: String,
    pub station: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RouteRecord {
    pub name: String,
    pub vehicle: Vehicle,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransferRecord {
    pub from: usize,
    pub to: usize,
    pub minutes: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DayRecord {
    pub date: NaiveDate,
    pub trips: Vec<TripRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TripRecord {
    pub route: usize,
    pub destination: String,
    pub calls: Vec<CallRecord>,
}

/// One stop of a trip. Either time may be omitted, in which case the other
/// one is used.
#[derive(Debug, Clone, Deserialize)]
pub struct CallRecord {
    pub stop: usize,
    pub arr: Option<String>,
    pub dep: Option<String>,
}

/// Station table.
#[derive(Debug, Clone, Default)]
pub struct StationTable(Vec<StationRecord>);

impl Stations for StationTable {
    fn len(&self) -> usize {
        self.0.len()
    }

    fn name(&self, id: usize) -> &str {
        &self.0[id].name
    }

    fn longitude(&self, id: usize) -> f64 {
        self.0[id].longitude
    }

    fn latitude(&self, id: usize) -> f64 {
        self.0[id].latitude
    }
}

/// Platform table.
#[derive(Debug, Clone, Default)]
pub struct PlatformTable(Vec<PlatformRecord>);

impl Platforms for PlatformTable {
    fn len(&self) -> usize {
        self.0.len()
    }

    fn name(&self, id: usize) -> &str {
        &self.0[id].name
    }

    fn station_id(&self, id: usize) -> usize {
        self.0[id].station
    }
}

/// Route table.
#[derive(Debug, Clone, Default)]
pub struct RouteTable(Vec<RouteRecord>);

impl Routes for RouteTable {
    fn len(&self) -> usize {
        self.0.len()
    }

    fn vehicle(&self, id: usize) -> Vehicle {
        self.0[id].vehicle
    }

    fn name(&self, id: usize) -> &str {
        &self.0[id].name
    }
}

#[derive(Debug, Clone, Copy)]
struct Transfer {
    dep_station: usize,
    minutes: u32,
}

/// Transfers sorted by arrival station, with one packed range per station.
#[derive(Debug, Clone, Default)]
pub struct TransferTable {
    transfers: Vec<Transfer>,
    arriving: Vec<PackedRange>,
}

impl TransferTable {
    /// Builds the table from `(from, to) -> minutes` pairs.
    fn new(
        station_count: usize,
        pairs: &HashMap<(usize, usize), u32>,
    ) -> Result<Self, TimetableError> {
        let mut sorted: Vec<_> = pairs.iter().map(|(&(f, t), &m)| (t, f, m)).collect();
        sorted.sort_unstable();

        let mut transfers = Vec::with_capacity(sorted.len());
        let mut arriving = Vec::with_capacity(station_count);
        let mut i = 0;
        for station in 0..station_count {
            let start = transfers.len();
            while i < sorted.len() && sorted[i].0 == station {
                let (_, dep_station, minutes) = sorted[i];
                transfers.push(Transfer {
                    dep_station,
                    minutes,
                });
                i += 1;
            }
            let range = PackedRange::new(start as u32, transfers.len() as u32).map_err(|e| {
                TimetableError::Invalid(format!("transfers arriving at station {station}: {e}"))
            })?;
            arriving.push(range);
        }

        Ok(Self {
            transfers,
            arriving,
        })
    }
}

impl Transfers for TransferTable {
    fn len(&self) -> usize {
        self.transfers.len()
    }

    fn dep_station_id(&self, id: usize) -> usize {
        self.transfers[id].dep_station
    }

    fn minutes(&self, id: usize) -> u32 {
        self.transfers[id].minutes
    }

    fn arriving_at(&self, station_id: usize) -> PackedRange {
        self.arriving[station_id]
    }

    fn minutes_between(
        &self,
        dep_station_id: usize,
        arr_station_id: usize,
    ) -> Result<u32, TimetableError> {
        let found = self
            .arriving
            .get(arr_station_id)
            .and_then(|range| {
                range
                    .iter()
                    .find(|&id| self.transfers[id].dep_station == dep_station_id)
            })
            .map(|id| self.transfers[id].minutes);

        match found {
            Some(minutes) => Ok(minutes),
            // Staying within a station is free unless the data says otherwise
            None if dep_station_id == arr_station_id => Ok(0),
            None => Err(TimetableError::TransferNotFound {
                from: dep_station_id,
                to: arr_station_id,
            }),
        }
    }
}

#[derive(Debug, Clone)]
struct Trip {
    route: usize,
    destination: String,
}

/// Trips of one service date.
#[derive(Debug, Clone, Default)]
pub struct TripTable(Vec<Trip>);

impl Trips for TripTable {
    fn len(&self) -> usize {
        self.0.len()
    }

    fn route_id(&self, id: usize) -> usize {
        self.0[id].route
    }

    fn destination(&self, id: usize) -> &str {
        &self.0[id].destination
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Connection {
    dep_stop: usize,
    dep_mins: i32,
    arr_stop: usize,
    arr_mins: i32,
    trip: usize,
    pos: u32,
    next: usize,
}

/// Connections of one service date, by descending departure.
#[derive(Debug, Clone, Default)]
pub struct ConnectionTable(Vec<Connection>);

impl Connections for ConnectionTable {
    fn len(&self) -> usize {
        self.0.len()
    }

    fn dep_stop_id(&self, id: usize) -> usize {
        self.0[id].dep_stop
    }

    fn dep_mins(&self, id: usize) -> i32 {
        self.0[id].dep_mins
    }

    fn arr_stop_id(&self, id: usize) -> usize {
        self.0[id].arr_stop
    }

    fn arr_mins(&self, id: usize) -> i32 {
        self.0[id].arr_mins
    }

    fn trip_id(&self, id: usize) -> usize {
        self.0[id].trip
    }

    fn trip_pos(&self, id: usize) -> u32 {
        self.0[id].pos
    }

    fn next_connection_id(&self, id: usize) -> usize {
        self.0[id].next
    }
}

#[derive(Debug, Clone, Default)]
struct Day {
    trips: TripTable,
    connections: ConnectionTable,
}

/// A timetable held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryTimeTable {
    stations: StationTable,
    platforms: PlatformTable,
    routes: RouteTable,
    transfers: TransferTable,
    days: BTreeMap<NaiveDate, Day>,
}

impl MemoryTimeTable {
    /// Loads and validates a timetable from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TimetableError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let table = Self::from_json_str(&text)?;
        info!(
            path = %path.as_ref().display(),
            stations = table.stations.len(),
            days = table.days.len(),
            "Loaded timetable"
        );
        Ok(table)
    }

    /// Parses and validates a timetable from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, TimetableError> {
        let document: TimetableDocument = serde_json::from_str(json)?;
        Self::from_document(document)
    }

    /// Validates a parsed document and builds the indexed tables.
    pub fn from_document(document: TimetableDocument) -> Result<Self, TimetableError> {
        let TimetableDocument {
            stations,
            platforms,
            routes,
            transfers,
            days,
        } = document;

        let station_count = stations.len();
        let stop_count = station_count + platforms.len();

        for (i, s) in stations.iter().enumerate() {
            Stop::new(s.name.as_str(), None, s.longitude, s.latitude)
                .map_err(|e| TimetableError::Invalid(format!("station {i}: {e}")))?;
        }

        for (i, p) in platforms.iter().enumerate() {
            if p.station >= station_count {
                return Err(TimetableError::Invalid(format!(
                    "platform {i} refers to unknown station {}",
                    p.station
                )));
            }
        }

        // Walkable both ways; keep the shortest walk when a pair repeats
        let mut pairs: HashMap<(usize, usize), u32> = HashMap::new();
        for t in &transfers {
            if t.from >= station_count || t.to >= station_count {
                return Err(TimetableError::Invalid(format!(
                    "transfer {} -> {} refers to an unknown station",
                    t.from, t.to
                )));
            }
            for key in [(t.from, t.to), (t.to, t.from)] {
                pairs
                    .entry(key)
                    .and_modify(|m| *m = (*m).min(t.minutes))
                    .or_insert(t.minutes);
            }
        }
        let transfers = TransferTable::new(station_count, &pairs)?;

        let mut built_days = BTreeMap::new();
        for day in days {
            if built_days.contains_key(&day.date) {
                return Err(TimetableError::Invalid(format!(
                    "date {} listed twice",
                    day.date
                )));
            }
            let built = build_day(&day, routes.len(), stop_count)?;
            built_days.insert(day.date, built);
        }

        Ok(Self {
            stations: StationTable(stations),
            platforms: PlatformTable(platforms),
            routes: RouteTable(routes),
            transfers,
            days: built_days,
        })
    }

    /// Service dates covered by the timetable.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.keys().copied()
    }

    /// Finds a station by id or by exact, case-insensitive name.
    pub fn find_station(&self, query: &str) -> Option<usize> {
        let query = query.trim();
        if let Ok(id) = query.parse::<usize>() {
            return (id < self.stations.len()).then_some(id);
        }
        (0..self.stations.len()).find(|&id| self.stations.name(id).eq_ignore_ascii_case(query))
    }
}

/// Builds trips and sorted connections for one date.
fn build_day(day: &DayRecord, route_count: usize, stop_count: usize) -> Result<Day, TimetableError> {
    let invalid = |trip: usize, msg: String| {
        TimetableError::Invalid(format!("{} trip {trip}: {msg}", day.date))
    };

    let mut trips = Vec::with_capacity(day.trips.len());
    let mut connections = Vec::new();

    for (trip_id, trip) in day.trips.iter().enumerate() {
        if trip.route >= route_count {
            return Err(invalid(trip_id, format!("unknown route {}", trip.route)));
        }
        if trip.calls.len() < 2 {
            return Err(invalid(trip_id, "needs at least two calls".into()));
        }
        if trip.calls.len() > MAX_TRIP_CALLS {
            return Err(invalid(
                trip_id,
                format!("has more than {MAX_TRIP_CALLS} calls"),
            ));
        }

        let mut times = Vec::with_capacity(trip.calls.len());
        for (i, call) in trip.calls.iter().enumerate() {
            if call.stop >= stop_count {
                return Err(invalid(trip_id, format!("call {i} at unknown stop {}", call.stop)));
            }
            let parse = |s: &Option<String>| {
                s.as_deref()
                    .map(parse_hhmm)
                    .transpose()
                    .map_err(|e| invalid(trip_id, format!("call {i}: {e}")))
            };
            let arr = parse(&call.arr)?;
            let dep = parse(&call.dep)?;
            let (arr, dep) = match (arr, dep) {
                (Some(a), Some(d)) => (a, d),
                (Some(a), None) => (a, a),
                (None, Some(d)) => (d, d),
                (None, None) => return Err(invalid(trip_id, format!("call {i} has no time"))),
            };
            if dep < arr {
                return Err(invalid(trip_id, format!("call {i} departs before it arrives")));
            }
            times.push((arr, dep));
        }

        for (pos, w) in trip.calls.windows(2).enumerate() {
            let dep_mins = times[pos].1;
            let arr_mins = times[pos + 1].0;
            if arr_mins < dep_mins {
                return Err(invalid(trip_id, format!("call {} goes back in time", pos + 1)));
            }
            connections.push(Connection {
                dep_stop: w[0].stop,
                dep_mins,
                arr_stop: w[1].stop,
                arr_mins,
                trip: trip_id,
                pos: pos as u32,
                next: 0,
            });
        }

        trips.push(Trip {
            route: trip.route,
            destination: trip.destination.clone(),
        });
    }

    // Latest departure first; within a trip, a later connection first
    connections.sort_by(|a, b| {
        b.dep_mins
            .cmp(&a.dep_mins)
            .then(b.arr_mins.cmp(&a.arr_mins))
            .then(b.pos.cmp(&a.pos))
            .then(a.trip.cmp(&b.trip))
    });

    let mut index: HashMap<(usize, u32), usize> = HashMap::with_capacity(connections.len());
    for (id, c) in connections.iter().enumerate() {
        index.insert((c.trip, c.pos), id);
    }
    let links: Vec<usize> = connections
        .iter()
        .map(|c| {
            index
                .get(&(c.trip, c.pos + 1))
                .or_else(|| index.get(&(c.trip, 0)))
                .copied()
                .unwrap_or_default()
        })
        .collect();
    for (c, next) in connections.iter_mut().zip(links) {
        c.next = next;
    }

    Ok(Day {
        trips: TripTable(trips),
        connections: ConnectionTable(connections),
    })
}

impl TimeTable for MemoryTimeTable {
    type Stations = StationTable;
    type Platforms = PlatformTable;
    type Routes = RouteTable;
    type Transfers = TransferTable;
    type Trips = TripTable;
    type Connections = ConnectionTable;

    fn stations(&self) -> &StationTable {
        &self.stations
    }

    fn platforms(&self) -> &PlatformTable {
        &self.platforms
    }

    fn routes(&self) -> &RouteTable {
        &self.routes
    }

    fn transfers(&self) -> &TransferTable {
        &self.transfers
    }

    fn trips_for(&self, date: NaiveDate) -> Result<&TripTable, TimetableError> {
        self.days
            .get(&date)
            .map(|d| &d.trips)
            .ok_or(TimetableError::NoServiceOn(date))
    }

    fn connections_for(&self, date: NaiveDate) -> Result<&ConnectionTable, TimetableError> {
        self.days
            .get(&date)
            .map(|d| &d.connections)
            .ok_or(TimetableError::NoServiceOn(date))
    }
}
