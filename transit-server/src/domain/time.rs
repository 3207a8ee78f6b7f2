//! Service-day time handling.
//!
//! Timetables express times as minutes from midnight of the service date.
//! Services running past midnight keep counting (`"25:10"` is 01:10 the next
//! day), and the planner also admits times a few hours before midnight, so
//! minute values may be negative or exceed a day.

use chrono::{Duration, NaiveDate, NaiveDateTime};

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// Latest hour accepted by [`parse_hhmm`] (services run at most two days).
const MAX_HOUR: u32 = 47;

const MINS_PER_DAY: i32 = 24 * 60;

/// Parses `"HH:MM"` into minutes from midnight.
///
/// Hours up to 47 are accepted for services running past midnight.
///
/// # Examples
///
/// ```
/// use transit_server::domain::parse_hhmm;
///
/// assert_eq!(parse_hhmm("08:05"), Ok(485));
/// assert_eq!(parse_hhmm("25:10"), Ok(1510));
///
/// assert!(parse_hhmm("8:05").is_err());
/// assert!(parse_hhmm("08:60").is_err());
/// assert!(parse_hhmm("48:00").is_err());
/// ```
pub fn parse_hhmm(s: &str) -> Result<i32, TimeError> {
    // Must be exactly 5 characters: HH:MM
    if s.len() != 5 {
        return Err(TimeError::new("expected HH:MM format"));
    }

    let bytes = s.as_bytes();

    if bytes[2] != b':' {
        return Err(TimeError::new("expected colon at position 2"));
    }

    let hour =
        parse_two_digits(&bytes[0..2]).ok_or_else(|| TimeError::new("invalid hour digits"))?;
    if hour > MAX_HOUR {
        return Err(TimeError::new("hour must be 0-47"));
    }

    let minute =
        parse_two_digits(&bytes[3..5]).ok_or_else(|| TimeError::new("invalid minute digits"))?;
    if minute > 59 {
        return Err(TimeError::new("minute must be 0-59"));
    }

    Ok((hour * 60 + minute) as i32)
}

/// Formats minutes from midnight as a wall-clock `"HH:MM"`.
///
/// Values outside the day wrap around: `-30` is `"23:30"`, `1510` is
/// `"01:10"`.
pub fn format_hhmm(mins: i32) -> String {
    let wall = mins.rem_euclid(MINS_PER_DAY);
    format!("{:02}:{:02}", wall / 60, wall % 60)
}

/// Date and time of `mins` minutes after midnight of `date`.
///
/// # Examples
///
/// ```
/// use transit_server::domain::datetime_at;
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2025, 3, 18).unwrap();
/// let dt = datetime_at(date, -30);
/// assert_eq!(dt.to_string(), "2025-03-17 23:30:00");
/// ```
pub fn datetime_at(date: NaiveDate, mins: i32) -> NaiveDateTime {
    date.and_time(chrono::NaiveTime::MIN) + Duration::minutes(mins as i64)
}

/// Parse two ASCII digit bytes into a u32.
fn parse_two_digits(bytes: &[u8]) -> Option<u32> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = (bytes[0] as char).to_digit(10)?;
    let d2 = (bytes[1] as char).to_digit(10)?;
    Some(d1 * 10 + d2)
}
