//! Journey types.
//!
//! A `Journey` is a complete itinerary from origin to destination: transport
//! legs joined by foot legs, possibly starting or ending with a walk.

use std::fmt;

use chrono::{Duration, NaiveDateTime};

use super::{DomainError, Leg, Stop};

/// A complete journey from origin to destination.
///
/// # Invariants
///
/// - At least one leg
/// - Legs alternate between transport and foot
/// - Each leg starts at the stop where the previous one ends
/// - No leg departs before the previous one arrives
#[derive(Debug, Clone, PartialEq)]
pub struct Journey {
    legs: Vec<Leg>,
}

impl Journey {
    /// Constructs a journey, validating the leg sequence.
    ///
    /// # Errors
    ///
    /// Returns `Err` if:
    /// - The leg list is empty
    /// - Two consecutive legs are of the same kind
    /// - A leg does not start at the previous leg's arrival stop
    /// - A leg departs before the previous leg arrives
    pub fn new(legs: Vec<Leg>) -> Result<Self, DomainError> {
        if legs.is_empty() {
            return Err(DomainError::EmptyJourney);
        }

        for (i, pair) in legs.windows(2).enumerate() {
            let (prev, next) = (&pair[0], &pair[1]);
            if prev.is_transport() == next.is_transport() {
                return Err(DomainError::LegsNotAlternating(i, i + 1));
            }
            if prev.arr_stop() != next.dep_stop() {
                return Err(DomainError::LegsNotConnected(i, i + 1));
            }
            if next.dep_time() < prev.arr_time() {
                return Err(DomainError::LegsOverlap(i, i + 1));
            }
        }

        Ok(Journey { legs })
    }

    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    // The accessors below index the first/last leg; `new` rejects empty lists.

    pub fn first_leg(&self) -> &Leg {
        &self.legs[0]
    }

    pub fn last_leg(&self) -> &Leg {
        &self.legs[self.legs.len() - 1]
    }

    pub fn dep_stop(&self) -> &Stop {
        self.first_leg().dep_stop()
    }

    pub fn dep_time(&self) -> NaiveDateTime {
        self.first_leg().dep_time()
    }

    pub fn arr_stop(&self) -> &Stop {
        self.last_leg().arr_stop()
    }

    pub fn arr_time(&self) -> NaiveDateTime {
        self.last_leg().arr_time()
    }

    /// Total time from first departure to last arrival.
    pub fn duration(&self) -> Duration {
        self.arr_time() - self.dep_time()
    }

    /// Number of transport legs.
    pub fn transport_count(&self) -> usize {
        self.legs.iter().filter(|l| l.is_transport()).count()
    }

    /// Number of changes between vehicles (transport legs - 1, or 0).
    pub fn change_count(&self) -> usize {
        self.transport_count().saturating_sub(1)
    }

    /// Returns true if this journey uses a single vehicle.
    pub fn is_direct(&self) -> bool {
        self.transport_count() == 1
    }
}

impl fmt::Display for Journey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} → {} {} ({} ch.)",
            self.dep_time().format("%H:%M"),
            self.dep_stop(),
            self.arr_time().format("%H:%M"),
            self.arr_stop(),
            self.change_count(),
        )?;
        for leg in &self.legs {
            write!(f, "\n  {leg}")?;
        }
        Ok(())
    }
}
