//! Timetable error types.

use chrono::NaiveDate;

/// Errors from loading or querying a timetable.
#[derive(Debug, thiserror::Error)]
pub enum TimetableError {
    /// The timetable file could not be read
    #[error("failed to read timetable: {0}")]
    Io(#[from] std::io::Error),

    /// The timetable document is not valid JSON for the expected schema
    #[error("failed to parse timetable: {0}")]
    Json(#[from] serde_json::Error),

    /// The document parsed but its content is inconsistent
    #[error("invalid timetable: {0}")]
    Invalid(String),

    /// No trips are known for this date
    #[error("no service on {0}")]
    NoServiceOn(NaiveDate),

    /// No walking transfer links the two stations
    #[error("no transfer from station {from} to station {to}")]
    TransferNotFound { from: usize, to: usize },
}
