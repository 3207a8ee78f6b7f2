//! Vehicle kinds.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of vehicle operating a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vehicle {
    Tram,
    Metro,
    Train,
    Bus,
    Ferry,
    AerialLift,
    Funicular,
}

impl Vehicle {
    /// All vehicle kinds, in declaration order.
    pub const ALL: [Vehicle; 7] = [
        Vehicle::Tram,
        Vehicle::Metro,
        Vehicle::Train,
        Vehicle::Bus,
        Vehicle::Ferry,
        Vehicle::AerialLift,
        Vehicle::Funicular,
    ];

    /// Lowercase label used in text output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Vehicle::Tram => "tram",
            Vehicle::Metro => "metro",
            Vehicle::Train => "train",
            Vehicle::Bus => "bus",
            Vehicle::Ferry => "ferry",
            Vehicle::AerialLift => "aerial lift",
            Vehicle::Funicular => "funicular",
        }
    }
}

impl fmt::Display for Vehicle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_names() {
        let v: Vehicle = serde_json::from_str("\"aerial_lift\"").unwrap();
        assert_eq!(v, Vehicle::AerialLift);
        assert_eq!(serde_json::to_string(&Vehicle::Train).unwrap(), "\"train\"");
    }

    #[test]
    fn display_labels_are_distinct() {
        let mut labels: Vec<_> = Vehicle::ALL.iter().map(|v| v.to_string()).collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), Vehicle::ALL.len());
    }
}
