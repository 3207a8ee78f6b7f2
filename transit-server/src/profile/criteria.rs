//! Packed Pareto criteria.
//!
//! A [`Criteria`] value stores one point of a Pareto frontier in a single
//! `u64`:
//!
//! ```text
//!  63          51 50        39 38     32 31                    0
//! +--------------+------------+---------+-----------------------+
//! | !dep (13 b)  | arr (12 b) | ch (7b) |     payload (32 b)    |
//! +--------------+------------+---------+-----------------------+
//! ```
//!
//! Minutes are counted from midnight of the service date and stored with a
//! +240 offset so that departures up to four hours before midnight remain
//! representable. The departure is stored complemented, which makes a later
//! departure compare *smaller*; an all-zero departure field means the
//! criterion carries no departure at all.

use std::fmt;

use crate::domain::format_hhmm;

/// Earliest representable minute (four hours before midnight).
pub const MIN_MINS: i32 = -240;

/// First minute past the representable range (midnight two days later).
pub const MAX_MINS: i32 = 2880;

/// Largest number of changes a criterion can hold.
pub const MAX_CHANGES: u32 = 127;

const MINS_OFFSET: i32 = 240;

const PAYLOAD_MASK: u64 = 0xFFFF_FFFF;
const CHANGES_SHIFT: u32 = 32;
const CHANGES_MASK: u64 = 0x7F;
const ARR_SHIFT: u32 = 39;
const ARR_MASK: u64 = 0xFFF;
const DEP_SHIFT: u32 = 51;
const DEP_MASK: u64 = 0x1FFF;

/// Errors from building or comparing criteria.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CriteriaError {
    /// A departure or arrival falls outside `[MIN_MINS, MAX_MINS)`.
    #[error("minutes {0} outside the representable range [-240, 2880)")]
    MinutesOutOfRange(i32),

    /// The change count does not fit in 7 bits.
    #[error("change count {0} exceeds {MAX_CHANGES}")]
    TooManyChanges(u32),

    /// Only one of the two criteria carries a departure time.
    #[error("cannot compare a criterion with a departure time to one without")]
    MixedDepartures,
}

fn check_mins(mins: i32) -> Result<u64, CriteriaError> {
    if (MIN_MINS..MAX_MINS).contains(&mins) {
        Ok((mins + MINS_OFFSET) as u64)
    } else {
        Err(CriteriaError::MinutesOutOfRange(mins))
    }
}

/// One packed Pareto criterion: optional departure, arrival, changes and an
/// opaque 32-bit payload.
///
/// Criteria are built by composition: [`Criteria::pack`], then optionally
/// [`Criteria::with_dep_mins`] and [`Criteria::with_payload`].
///
/// # Examples
///
/// ```
/// use transit_server::profile::Criteria;
///
/// let c = Criteria::pack(540, 1, 42).unwrap().with_dep_mins(480).unwrap();
/// assert_eq!(c.dep_mins(), Some(480));
/// assert_eq!(c.arr_mins(), 540);
/// assert_eq!(c.changes(), 1);
/// assert_eq!(c.payload(), 42);
///
/// assert!(Criteria::pack(3000, 0, 0).is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Criteria(u64);

impl Criteria {
    /// Packs an arrival, a change count and a payload, without departure.
    pub fn pack(arr_mins: i32, changes: u32, payload: u32) -> Result<Self, CriteriaError> {
        let arr = check_mins(arr_mins)?;
        if changes > MAX_CHANGES {
            return Err(CriteriaError::TooManyChanges(changes));
        }
        Ok(Self(
            (arr << ARR_SHIFT) | ((changes as u64) << CHANGES_SHIFT) | payload as u64,
        ))
    }

    /// Rebuilds a criterion from its raw bits, as produced by [`Criteria::bits`].
    pub fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Returns the raw packed bits.
    pub fn bits(&self) -> u64 {
        self.0
    }

    /// Returns a copy carrying the given departure, replacing any previous one.
    pub fn with_dep_mins(self, dep_mins: i32) -> Result<Self, CriteriaError> {
        let dep = check_mins(dep_mins)?;
        let complement = !dep & DEP_MASK;
        Ok(Self(self.without_dep_mins().0 | (complement << DEP_SHIFT)))
    }

    /// Returns a copy without departure.
    pub fn without_dep_mins(self) -> Self {
        Self(self.0 & !(DEP_MASK << DEP_SHIFT))
    }

    /// Returns a copy with one more change.
    pub fn with_additional_change(self) -> Result<Self, CriteriaError> {
        let changes = self.changes();
        if changes >= MAX_CHANGES {
            return Err(CriteriaError::TooManyChanges(changes + 1));
        }
        Ok(Self(self.0 + (1 << CHANGES_SHIFT)))
    }

    /// Returns a copy with the payload replaced.
    pub fn with_payload(self, payload: u32) -> Self {
        Self((self.0 & !PAYLOAD_MASK) | payload as u64)
    }

    /// Returns true if a departure is attached.
    pub fn has_dep_mins(&self) -> bool {
        self.dep_field() != 0
    }

    /// Departure in minutes from midnight, if any.
    pub fn dep_mins(&self) -> Option<i32> {
        match self.dep_field() {
            0 => None,
            field => Some((!field & DEP_MASK) as i32 - MINS_OFFSET),
        }
    }

    /// Arrival in minutes from midnight.
    pub fn arr_mins(&self) -> i32 {
        ((self.0 >> ARR_SHIFT) & ARR_MASK) as i32 - MINS_OFFSET
    }

    /// Number of changes.
    pub fn changes(&self) -> u32 {
        ((self.0 >> CHANGES_SHIFT) & CHANGES_MASK) as u32
    }

    /// Opaque payload.
    pub fn payload(&self) -> u32 {
        (self.0 & PAYLOAD_MASK) as u32
    }

    /// Returns true if `self` is at least as good as `other` on every
    /// criterion: later or equal departure, earlier or equal arrival, fewer or
    /// equal changes. Payloads are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CriteriaError::MixedDepartures`] if exactly one of the two
    /// carries a departure.
    pub fn dominates_or_is_equal(&self, other: &Criteria) -> Result<bool, CriteriaError> {
        if self.has_dep_mins() != other.has_dep_mins() {
            return Err(CriteriaError::MixedDepartures);
        }
        Ok(self.dominates_unchecked(other))
    }

    /// Dominance test for criteria already known to agree on departure
    /// presence.
    ///
    /// Because the departure is stored complemented, "later or equal
    /// departure" is "smaller or equal field", the same direction as arrival
    /// and changes.
    pub(crate) fn dominates_unchecked(&self, other: &Criteria) -> bool {
        self.dep_field() <= other.dep_field()
            && self.arr_mins() <= other.arr_mins()
            && self.changes() <= other.changes()
    }

    /// Sort key: the packed value with the payload cleared.
    pub(crate) fn key(&self) -> u64 {
        self.0 & !PAYLOAD_MASK
    }

    fn dep_field(&self) -> u64 {
        (self.0 >> DEP_SHIFT) & DEP_MASK
    }
}

impl fmt::Debug for Criteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Criteria")
            .field("dep_mins", &self.dep_mins())
            .field("arr_mins", &self.arr_mins())
            .field("changes", &self.changes())
            .field("payload", &format_args!("{:#010x}", self.payload()))
            .finish()
    }
}

impl fmt::Display for Criteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(dep) = self.dep_mins() {
            write!(f, "{}–", format_hhmm(dep))?;
        }
        write!(f, "{} ({} ch.)", format_hhmm(self.arr_mins()), self.changes())
    }
}
