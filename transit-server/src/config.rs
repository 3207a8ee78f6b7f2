//! Server configuration, read from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::cache::CacheConfig;

/// Error from reading the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is not set
    #[error("{0} is not set")]
    Missing(&'static str),

    /// A variable is set but cannot be parsed
    #[error("{name} has invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Configuration of the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// JSON timetable to serve (`TIMETABLE_PATH`).
    pub timetable_path: PathBuf,

    /// Listening address (`BIND_ADDR`).
    pub bind_addr: SocketAddr,

    /// Profile cache settings (`PROFILE_CACHE_CAPACITY`,
    /// `PROFILE_CACHE_TTL_SECS`).
    pub cache: CacheConfig,

    /// Destinations whose profiles are computed at start-up
    /// (`PREFETCH_DESTINATIONS`, comma-separated station ids or names).
    pub prefetch_destinations: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            timetable_path: PathBuf::new(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            cache: CacheConfig::default(),
            prefetch_destinations: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name
    /// to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let timetable_path = lookup("TIMETABLE_PATH")
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .ok_or(ConfigError::Missing("TIMETABLE_PATH"))?;
        let mut config = Self {
            timetable_path,
            ..Self::default()
        };

        if let Some(addr) = parsed(&lookup, "BIND_ADDR")? {
            config.bind_addr = addr;
        }
        if let Some(capacity) = parsed(&lookup, "PROFILE_CACHE_CAPACITY")? {
            config.cache.max_capacity = capacity;
        }
        if let Some(secs) = parsed(&lookup, "PROFILE_CACHE_TTL_SECS")? {
            config.cache.ttl = Duration::from_secs(secs);
        }
        if let Some(list) = lookup("PREFETCH_DESTINATIONS") {
            config.prefetch_destinations = list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect();
        }

        Ok(config)
    }
}

fn parsed<V>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<V>, ConfigError>
where
    V: std::str::FromStr,
    V::Err: std::fmt::Display,
{
    let Some(value) = lookup(name) else {
        return Ok(None);
    };
    value
        .trim()
        .parse()
        .map(Some)
        .map_err(|e: V::Err| ConfigError::Invalid {
            name,
            value,
            reason: e.to_string(),
        })
}
