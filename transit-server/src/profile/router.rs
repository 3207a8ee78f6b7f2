//! Backward connection scan.
//!
//! Connections are visited from the latest departure to the earliest, so
//! when a connection is processed every journey that could follow it is
//! already known. Each station accumulates a frontier of
//! `(departure, arrival, changes)` criteria; each trip accumulates a scratch
//! frontier of the criteria reachable by staying on board.
//!
//! Payloads are [`Bits24x8`] pairs. In a trip frontier, and in the candidate
//! set of a connection, the pair is `(connection, position of the connection
//! to alight after)`. In a station frontier it is `(connection to board,
//! number of intermediate stops before alighting)`.

use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use tracing::{debug, trace};

use super::{Criteria, CriteriaError, ParetoFrontBuilder, Profile, ProfileBuilder, ProfileError};
use crate::bits::{Bits24x8, BitsError};
use crate::timetable::{Connections, Stations, TimeTable, TimetableError, Transfers};

/// Error from profile computation.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// The destination is not a station of the timetable
    #[error("unknown destination station {0}")]
    UnknownStation(usize),

    /// Connections are not in descending departure order
    #[error("connection {0} breaks the descending departure order")]
    UnsortedConnections(usize),

    #[error(transparent)]
    Timetable(#[from] TimetableError),

    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error(transparent)]
    Criteria(#[from] CriteriaError),

    #[error(transparent)]
    Bits(#[from] BitsError),

    /// The computation did not run to completion
    #[error("profile computation aborted: {0}")]
    Aborted(String),
}

/// Computes profiles on a shared timetable.
#[derive(Debug)]
pub struct Router<T> {
    timetable: Arc<T>,
}

impl<T> Clone for Router<T> {
    fn clone(&self) -> Self {
        Self {
            timetable: Arc::clone(&self.timetable),
        }
    }
}

impl<T: TimeTable> Router<T> {
    pub fn new(timetable: Arc<T>) -> Self {
        Self { timetable }
    }

    pub fn timetable(&self) -> &Arc<T> {
        &self.timetable
    }

    /// Builds the profile of every station towards `arr_station_id` on `date`.
    ///
    /// # Errors
    ///
    /// Fails if the destination is unknown, the date has no service, or the
    /// timetable's connections are not sorted by descending departure.
    pub fn profile(
        &self,
        date: NaiveDate,
        arr_station_id: usize,
    ) -> Result<Profile<T>, RouterError> {
        let started = Instant::now();
        let tt = &*self.timetable;
        let station_count = tt.stations().len();
        if arr_station_id >= station_count {
            return Err(RouterError::UnknownStation(arr_station_id));
        }

        let connections = tt.connections_for(date)?;
        let transfers = tt.transfers();
        let mut profile = ProfileBuilder::new(Arc::clone(&self.timetable), date, arr_station_id)?;

        let mut walk_to_dest: Vec<Option<i32>> = vec![None; station_count];
        for id in transfers.arriving_at(arr_station_id).iter() {
            walk_to_dest[transfers.dep_station_id(id)] = Some(transfers.minutes(id) as i32);
        }
        walk_to_dest[arr_station_id] = Some(0);

        let mut f = ParetoFrontBuilder::new();
        let mut last_dep = i32::MAX;
        let mut published = 0usize;

        for c in 0..connections.len() {
            let dep_mins = connections.dep_mins(c);
            if dep_mins > last_dep {
                return Err(RouterError::UnsortedConnections(c));
            }
            last_dep = dep_mins;

            let arr_mins = connections.arr_mins(c);
            let dep_station = tt.station_id(connections.dep_stop_id(c));
            let arr_station = tt.station_id(connections.arr_stop_id(c));
            let trip = connections.trip_id(c);
            let pos = connections.trip_pos(c);
            let here = Bits24x8::pack(c as u32, pos)?;

            f.clear();

            // Alight and walk to the destination
            if let Some(walk) = walk_to_dest[arr_station] {
                match Criteria::pack(arr_mins + walk, 0, here) {
                    Ok(crit) => f.add(crit)?,
                    Err(e) => trace!(connection = c, error = %e, "Arrival out of range"),
                }
            }

            // Stay on board
            f.add_all(profile.for_trip(trip)?)?;

            // Alight and change. Station frontiers are sorted by descending
            // departure, so stop at the first one leaving too early.
            for crit in profile.for_station(arr_station)?.iter() {
                if crit.dep_mins().is_none_or(|d| d < arr_mins) {
                    break;
                }
                let Ok(changed) = crit.without_dep_mins().with_additional_change() else {
                    continue;
                };
                f.add(changed.with_payload(here))?;
            }

            if f.is_empty() {
                continue;
            }

            // Earlier connections of the trip must see f even if boarding here
            // is useless.
            profile.trip_mut(trip)?.add_all(&f)?;

            if profile.for_station(dep_station)?.fully_dominates(&f, dep_mins)? {
                continue;
            }

            let mut has_self_transfer = false;
            for id in transfers.arriving_at(dep_station).iter() {
                let from = transfers.dep_station_id(id);
                has_self_transfer |= from == dep_station;
                let walk = transfers.minutes(id) as i32;
                publish(&mut profile, &f, c, pos, from, dep_mins - walk)?;
            }
            if !has_self_transfer {
                publish(&mut profile, &f, c, pos, dep_station, dep_mins)?;
            }
            published += 1;
        }

        let profile = profile.build();
        debug!(
            %date,
            destination = arr_station_id,
            connections = connections.len(),
            published,
            reachable = profile.reachable_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Profile computed"
        );
        Ok(profile)
    }
}

/// Adds every criterion of `f` to the frontier of `station`, leaving at
/// `dep_mins` to board connection `c` at trip position `pos`.
fn publish<T: TimeTable>(
    profile: &mut ProfileBuilder<T>,
    f: &ParetoFrontBuilder,
    c: usize,
    pos: u32,
    station: usize,
    dep_mins: i32,
) -> Result<(), RouterError> {
    let front = profile.station_mut(station)?;
    for crit in f.iter() {
        let timed = match crit.with_dep_mins(dep_mins) {
            Ok(timed) => timed,
            Err(e) => {
                trace!(connection = c, station, dep_mins, error = %e, "Departure out of range");
                return Ok(());
            }
        };
        let alight_pos = Bits24x8::unpack8(crit.payload());
        let stops = alight_pos
            .checked_sub(pos)
            .ok_or(RouterError::UnsortedConnections(c))?;
        front.add(timed.with_payload(Bits24x8::pack(c as u32, stops)?))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        LAUSANNE, MORGES, RENENS, RENENS_SUD, StubTimeTable, chain_timetable, date,
        late_timetable, line_timetable, sample_timetable,
    };

    fn triples(profile: &Profile<impl TimeTable>, station: usize) -> Vec<(Option<i32>, i32, u32)> {
        profile
            .for_station(station)
            .unwrap()
            .iter()
            .map(|c| (c.dep_mins(), c.arr_mins(), c.changes()))
            .collect()
    }

    #[test]
    fn lausanne_to_morges() {
        let router = Router::new(sample_timetable());
        let profile = router.profile(date(), MORGES).unwrap();

        // The 07:50 bus arrives after the 08:00 train and is pruned
        assert_eq!(
            triples(&profile, LAUSANNE),
            vec![(Some(490), 525, 1), (Some(480), 495, 0)]
        );
    }

    #[test]
    fn transfers_spread_to_neighbours() {
        let profile = Router::new(sample_timetable())
            .profile(date(), MORGES)
            .unwrap();

        // Walk 4 min to Renens Sud for the bus, or 2 min to platform 2
        assert_eq!(
            triples(&profile, RENENS),
            vec![(Some(501), 525, 0), (Some(484), 495, 0)]
        );
        assert_eq!(
            triples(&profile, RENENS_SUD),
            vec![(Some(505), 525, 0), (Some(482), 495, 0)]
        );
        assert!(profile.for_station(MORGES).unwrap().is_empty());
    }

    #[test]
    fn payload_names_boarding_connection() {
        let tt = sample_timetable();
        let profile = Router::new(Arc::clone(&tt)).profile(date(), MORGES).unwrap();
        let conns = tt.connections_for(date()).unwrap();

        let direct = profile.for_station(LAUSANNE).unwrap().get(495, 0).unwrap();
        let conn = Bits24x8::unpack24(direct.payload()) as usize;
        assert_eq!(conns.dep_stop_id(conn), 4);
        assert_eq!(conns.dep_mins(conn), 480);
        // Renens is an intermediate stop
        assert_eq!(Bits24x8::unpack8(direct.payload()), 1);
    }

    #[test]
    fn nothing_reaches_a_station_without_arrivals() {
        let profile = Router::new(sample_timetable())
            .profile(date(), LAUSANNE)
            .unwrap();
        assert_eq!(profile.reachable_count(), 0);
    }

    #[test]
    fn line_profile() {
        let profile = Router::new(line_timetable()).profile(date(), 2).unwrap();
        assert_eq!(triples(&profile, 0), vec![(Some(480), 540, 0)]);
        assert_eq!(triples(&profile, 1), vec![(Some(511), 540, 0)]);
        assert_eq!(
            Bits24x8::unpack8(profile.for_station(0).unwrap().as_slice()[0].payload()),
            1
        );
    }

    #[test]
    fn two_change_chain() {
        let profile = Router::new(chain_timetable()).profile(date(), 3).unwrap();

        // Stay on R0 through B then change at C, or change twice early on
        assert_eq!(
            triples(&profile, 0),
            vec![(Some(480), 520, 1), (Some(420), 470, 2)]
        );
        assert_eq!(
            triples(&profile, 1),
            vec![(Some(491), 520, 1), (Some(440), 470, 1)]
        );
        assert_eq!(
            triples(&profile, 2),
            vec![(Some(510), 520, 0), (Some(455), 470, 0)]
        );

        // Boarding at A rides past one stop before alighting at C
        let late = profile.for_station(0).unwrap().get(520, 1).unwrap();
        assert_eq!(Bits24x8::unpack8(late.payload()), 1);
    }

    #[test]
    fn times_past_midnight() {
        let profile = Router::new(late_timetable()).profile(date(), 2).unwrap();

        // 24:20 arrival plus the 30 min walk; the 47:00 trip would arrive
        // at 48:20 and is left out
        assert_eq!(
            triples(&profile, 0),
            vec![(Some(1430), 1490, 0), (Some(10), 70, 0)]
        );
        // Walking 300 min to catch the 00:10 would mean leaving at -04:50
        assert_eq!(triples(&profile, 3), vec![(Some(1130), 1490, 0)]);
        assert!(profile.for_station(1).unwrap().is_empty());
    }

    #[test]
    fn unsorted_connections_are_rejected() {
        let mut stub = StubTimeTable::new(sample_timetable());
        stub.connections.0.reverse();

        let result = Router::new(Arc::new(stub)).profile(date(), MORGES);
        assert!(matches!(result, Err(RouterError::UnsortedConnections(1))));
    }

    #[test]
    fn unknown_destination() {
        let result = Router::new(sample_timetable()).profile(date(), 42);
        assert!(matches!(result, Err(RouterError::UnknownStation(42))));
    }

    #[test]
    fn unknown_date() {
        let other = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
        let result = Router::new(sample_timetable()).profile(other, MORGES);
        assert!(matches!(
            result,
            Err(RouterError::Timetable(TimetableError::NoServiceOn(d))) if d == other
        ));
    }

    #[test]
    fn every_frontier_is_pareto_optimal() {
        let profile = Router::new(sample_timetable())
            .profile(date(), MORGES)
            .unwrap();
        for station in 0..4 {
            let front = profile.for_station(station).unwrap();
            for (i, a) in front.iter().enumerate() {
                for (j, b) in front.iter().enumerate() {
                    if i != j {
                        assert!(!a.dominates_or_is_equal(b).unwrap());
                    }
                }
            }
        }
    }
}
