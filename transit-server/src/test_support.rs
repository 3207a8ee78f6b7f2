//! Small timetables shared by unit tests.
//!
//! The sample network around Lausanne, all on [`date`]:
//!
//! - stations `0` Lausanne, `1` Renens, `2` Renens Sud, `3` Morges
//! - platforms: stop `4` is Lausanne platform 1, stop `5` is Renens platform 2
//! - walks: Renens <-> Renens Sud 4 min, changing within Renens 2 min
//! - IR 15: Lausanne pl. 1 08:00, Renens pl. 2 08:05/08:06, Morges 08:15
//! - 701 bus: Renens Sud 08:25, Morges 08:45
//! - S1: Lausanne 08:10, Renens 08:14
//! - 701 bus: Lausanne 07:50, Morges 08:30 (beaten by the IR 15)

use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::json;

use crate::timetable::memory::{
    PlatformTable, RouteTable, StationTable, TransferTable, TripTable,
};
use crate::timetable::{Connections, MemoryTimeTable, TimeTable, TimetableError};

pub const LAUSANNE: usize = 0;
pub const RENENS: usize = 1;
pub const RENENS_SUD: usize = 2;
pub const MORGES: usize = 3;

pub fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 18).unwrap()
}

pub fn sample_json() -> String {
    json!({
        "stations": [
            {"name": "Lausanne", "longitude": 6.629, "latitude": 46.516},
            {"name": "Renens", "longitude": 6.578, "latitude": 46.537},
            {"name": "Renens Sud", "longitude": 6.581, "latitude": 46.533},
            {"name": "Morges", "longitude": 6.494, "latitude": 46.511}
        ],
        "platforms": [
            {"name": "1", "station": 0},
            {"name": "2", "station": 1}
        ],
        "routes": [
            {"name": "IR 15", "vehicle": "train"},
            {"name": "701", "vehicle": "bus"},
            {"name": "S1", "vehicle": "train"}
        ],
        "transfers": [
            {"from": 1, "to": 2, "minutes": 4},
            {"from": 1, "to": 1, "minutes": 2}
        ],
        "days": [{
            "date": "2025-03-18",
            "trips": [
                {"route": 0, "destination": "Genève", "calls": [
                    {"stop": 4, "dep": "08:00"},
                    {"stop": 5, "arr": "08:05", "dep": "08:06"},
                    {"stop": 3, "arr": "08:15"}
                ]},
                {"route": 1, "destination": "Morges", "calls": [
                    {"stop": 2, "dep": "08:25"},
                    {"stop": 3, "arr": "08:45"}
                ]},
                {"route": 2, "destination": "Renens", "calls": [
                    {"stop": 0, "dep": "08:10"},
                    {"stop": 1, "arr": "08:14"}
                ]},
                {"route": 1, "destination": "Morges", "calls": [
                    {"stop": 0, "dep": "07:50"},
                    {"stop": 3, "arr": "08:30"}
                ]}
            ]
        }]
    })
    .to_string()
}

pub fn sample_timetable() -> Arc<MemoryTimeTable> {
    Arc::new(MemoryTimeTable::from_json_str(&sample_json()).unwrap())
}

/// Builds a timetable for [`date`] from station names, `(from, to, minutes)`
/// transfers and trips given as `(route, calls)`, each call being
/// `(stop, arr, dep)`. Routes are trains named after their index.
pub fn network(
    stations: &[&str],
    transfers: &[(usize, usize, u32)],
    trips: Vec<(usize, Vec<(usize, &str, &str)>)>,
) -> Arc<MemoryTimeTable> {
    let routes = trips.iter().map(|(r, _)| *r).max().map_or(0, |r| r + 1);
    let json = json!({
        "stations": stations
            .iter()
            .enumerate()
            .map(|(i, name)| {
                json!({"name": name, "longitude": 7.0, "latitude": 46.0 + i as f64 / 100.0})
            })
            .collect::<Vec<_>>(),
        "routes": (0..routes)
            .map(|r| json!({"name": format!("R{r}"), "vehicle": "train"}))
            .collect::<Vec<_>>(),
        "transfers": transfers
            .iter()
            .map(|&(from, to, minutes)| json!({"from": from, "to": to, "minutes": minutes}))
            .collect::<Vec<_>>(),
        "days": [{
            "date": "2025-03-18",
            "trips": trips
                .iter()
                .map(|(route, calls)| json!({
                    "route": route,
                    "destination": stations[calls[calls.len() - 1].0],
                    "calls": calls
                        .iter()
                        .map(|&(stop, arr, dep)| json!({"stop": stop, "arr": arr, "dep": dep}))
                        .collect::<Vec<_>>(),
                }))
                .collect::<Vec<_>>(),
        }]
    });
    Arc::new(MemoryTimeTable::from_json_str(&json.to_string()).unwrap())
}

/// Stations A, B, C, D without transfers, towards D:
///
/// - R0: A 08:00, B 08:10/08:11, C 08:20, then R1: C 08:30, D 08:40
/// - R2: A 07:00, B 07:10; R3: B 07:20, C 07:30; R1: C 07:35, D 07:50
pub fn chain_timetable() -> Arc<MemoryTimeTable> {
    network(
        &["A", "B", "C", "D"],
        &[],
        vec![
            (0, vec![(0, "08:00", "08:00"), (1, "08:10", "08:11"), (2, "08:20", "08:20")]),
            (1, vec![(2, "08:30", "08:30"), (3, "08:40", "08:40")]),
            (2, vec![(0, "07:00", "07:00"), (1, "07:10", "07:10")]),
            (3, vec![(1, "07:20", "07:20"), (2, "07:30", "07:30")]),
            (1, vec![(2, "07:35", "07:35"), (3, "07:50", "07:50")]),
        ],
    )
}

/// Stations X, Y, Z, W towards Z, with walks Y <-> Z 30 min and
/// X <-> W 300 min:
///
/// - X 23:50, Y 24:20
/// - X 47:00, Y 47:50 (walking on reaches Z after the last minute)
/// - X 00:10, Y 00:40 (leaving W for it means setting off the day before)
pub fn late_timetable() -> Arc<MemoryTimeTable> {
    network(
        &["X", "Y", "Z", "W"],
        &[(1, 2, 30), (0, 3, 300)],
        vec![
            (0, vec![(0, "23:50", "23:50"), (1, "24:20", "24:20")]),
            (0, vec![(0, "47:00", "47:00"), (1, "47:50", "47:50")]),
            (0, vec![(0, "00:10", "00:10"), (1, "00:40", "00:40")]),
        ],
    )
}

/// A connection of a [`StubTimeTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StubConnection {
    pub dep_stop: usize,
    pub dep_mins: i32,
    pub arr_stop: usize,
    pub arr_mins: i32,
    pub trip: usize,
    pub pos: u32,
    pub next: usize,
}

/// Connections stored as given, without sorting or checks.
#[derive(Debug, Clone, Default)]
pub struct StubConnections(pub Vec<StubConnection>);

impl Connections for StubConnections {
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

/// A [`MemoryTimeTable`] whose connections on [`date`] can be edited freely,
/// to feed the router and extractor data the loader would reject.
#[derive(Debug, Clone)]
pub struct StubTimeTable {
    inner: Arc<MemoryTimeTable>,
    pub connections: StubConnections,
}

impl StubTimeTable {
    /// Starts from a copy of `inner`'s connections on [`date`].
    pub fn new(inner: Arc<MemoryTimeTable>) -> Self {
        let conns = inner.connections_for(date()).unwrap();
        let connections = (0..conns.len())
            .map(|id| StubConnection {
                dep_stop: conns.dep_stop_id(id),
                dep_mins: conns.dep_mins(id),
                arr_stop: conns.arr_stop_id(id),
                arr_mins: conns.arr_mins(id),
                trip: conns.trip_id(id),
                pos: conns.trip_pos(id),
                next: conns.next_connection_id(id),
            })
            .collect();
        Self {
            inner,
            connections: StubConnections(connections),
        }
    }
}

impl TimeTable for StubTimeTable {
    type Stations = StationTable;
    type Platforms = PlatformTable;
    type Routes = RouteTable;
    type Transfers = TransferTable;
    type Trips = TripTable;
    type Connections = StubConnections;

    fn stations(&self) -> &StationTable {
        self.inner.stations()
    }

    fn platforms(&self) -> &PlatformTable {
        self.inner.platforms()
    }

    fn routes(&self) -> &RouteTable {
        self.inner.routes()
    }

    fn transfers(&self) -> &TransferTable {
        self.inner.transfers()
    }

    fn trips_for(&self, date: NaiveDate) -> Result<&TripTable, TimetableError> {
        self.inner.trips_for(date)
    }

    fn connections_for(&self, date: NaiveDate) -> Result<&StubConnections, TimetableError> {
        self.inner
            .connections_for(date)
            .map(|_| &self.connections)
    }
}

/// One train A 08:00, M 08:30/08:31, B 09:00.
pub fn line_timetable() -> Arc<MemoryTimeTable> {
    let json = json!({
        "stations": [
            {"name": "A", "longitude": 7.0, "latitude": 46.0},
            {"name": "M", "longitude": 7.1, "latitude": 46.1},
            {"name": "B", "longitude": 7.2, "latitude": 46.2}
        ],
        "routes": [{"name": "R1", "vehicle": "train"}],
        "days": [{
            "date": "2025-03-18",
            "trips": [
                {"route": 0, "destination": "B", "calls": [
                    {"stop": 0, "dep": "08:00"},
                    {"stop": 1, "arr": "08:30", "dep": "08:31"},
                    {"stop": 2, "arr": "09:00"}
                ]}
            ]
        }]
    });
    Arc::new(MemoryTimeTable::from_json_str(&json.to_string()).unwrap())
}
