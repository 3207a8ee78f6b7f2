//! Domain error types.
//!
//! These errors represent validation failures of journey value types.
//! They are distinct from timetable and routing errors.

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Invalid stop (e.g., coordinates out of range)
    #[error("invalid stop: {0}")]
    InvalidStop(&'static str),

    /// Invalid leg construction (e.g., arrival before departure)
    #[error("invalid leg: {0}")]
    InvalidLeg(&'static str),

    /// Two consecutive legs have the same kind
    #[error("legs {0} and {1} are both transport or both foot legs")]
    LegsNotAlternating(usize, usize),

    /// A leg does not start where the previous one ended
    #[error("leg {1} does not start at the stop where leg {0} ends")]
    LegsNotConnected(usize, usize),

    /// A leg departs before the previous one arrives
    #[error("leg {1} departs before leg {0} arrives")]
    LegsOverlap(usize, usize),

    /// Journey has no legs
    #[error("journey must have at least one leg")]
    EmptyJourney,
}
