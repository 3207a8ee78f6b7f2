//! Domain types for the journey planner.
//!
//! This module contains the output-facing value types produced by journey
//! extraction. All types enforce their invariants at construction time, so
//! code that receives these types can trust their validity.

mod error;
mod journey;
mod leg;
mod stop;
mod time;
mod vehicle;

pub use error::DomainError;
pub use journey::Journey;
pub use leg::{Foot, IntermediateStop, Leg, Line, Transport};
pub use stop::Stop;
pub use time::{TimeError, datetime_at, format_hhmm, parse_hhmm};
pub use vehicle::Vehicle;
