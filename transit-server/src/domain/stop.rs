//! Stops as shown to travellers.

use std::fmt;

use super::DomainError;

/// A place where a journey leg starts or ends: a station, or a platform of
/// a station.
#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    name: String,
    platform_name: Option<String>,
    longitude: f64,
    latitude: f64,
}

impl Stop {
    /// Creates a stop, validating its coordinates.
    ///
    /// # Examples
    ///
    /// ```
    /// use transit_server::domain::Stop;
    ///
    /// let stop = Stop::new("Lausanne", Some("1"), 6.629, 46.516).unwrap();
    /// assert_eq!(stop.to_string(), "Lausanne (platform 1)");
    ///
    /// assert!(Stop::new("Nowhere", None, 200.0, 0.0).is_err());
    /// ```
    pub fn new(
        name: impl Into<String>,
        platform_name: Option<&str>,
        longitude: f64,
        latitude: f64,
    ) -> Result<Self, DomainError> {
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(DomainError::InvalidStop("longitude must be within ±180°"));
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(DomainError::InvalidStop("latitude must be within ±90°"));
        }
        Ok(Self {
            name: name.into(),
            platform_name: platform_name.map(str::to_owned),
            longitude,
            latitude,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn platform_name(&self) -> Option<&str> {
        self.platform_name.as_deref()
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }
}

impl fmt::Display for Stop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.platform_name {
            Some(p) if !p.is_empty() => write!(f, "{} (platform {p})", self.name),
            _ => f.write_str(&self.name),
        }
    }
}
