//! Caching layer for computed profiles.
//!
//! A profile depends only on the timetable, the date and the destination, and
//! one scan serves every departure station. Profiles are kept in a bounded
//! moka cache keyed by `(date, destination)`; concurrent requests for the
//! same key share one computation.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use futures::future::join_all;
use moka::future::Cache as MokaCache;
use tracing::{debug, warn};

use crate::profile::{Profile, Router, RouterError};
use crate::timetable::TimeTable;

/// Cache key for profiles: (service date, destination station).
type ProfileKey = (NaiveDate, usize);

/// Configuration for the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached profiles.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(3600),
            max_capacity: 64,
        }
    }
}

/// Cache of profiles computed by a [`Router`].
pub struct ProfileCache<T> {
    profiles: MokaCache<ProfileKey, Arc<Profile<T>>>,
}

impl<T> ProfileCache<T>
where
    T: TimeTable + Send + Sync + 'static,
{
    /// Create a new cache with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let profiles = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { profiles }
    }

    /// Get a cached profile.
    pub async fn get(&self, date: NaiveDate, arr_station_id: usize) -> Option<Arc<Profile<T>>> {
        self.profiles.get(&(date, arr_station_id)).await
    }

    /// Returns the cached profile, computing it on a blocking thread if
    /// missing.
    ///
    /// Errors are returned to every waiting caller and not cached.
    pub async fn get_or_compute(
        &self,
        router: &Router<T>,
        date: NaiveDate,
        arr_station_id: usize,
    ) -> Result<Arc<Profile<T>>, Arc<RouterError>> {
        let router = router.clone();
        self.profiles
            .try_get_with((date, arr_station_id), async move {
                debug!(%date, destination = arr_station_id, "Profile cache miss");
                tokio::task::spawn_blocking(move || router.profile(date, arr_station_id))
                    .await
                    .map_err(|e| RouterError::Aborted(e.to_string()))?
                    .map(Arc::new)
            })
            .await
    }

    /// Computes the profiles of several destinations concurrently. Returns
    /// how many are now cached.
    pub async fn prefetch(
        &self,
        router: &Router<T>,
        date: NaiveDate,
        destinations: &[usize],
    ) -> usize {
        let results = join_all(
            destinations
                .iter()
                .map(|&dest| self.get_or_compute(router, date, dest)),
        )
        .await;

        let mut cached = 0;
        for (dest, result) in destinations.iter().zip(results) {
            match result {
                Ok(_) => cached += 1,
                Err(e) => warn!(%date, destination = dest, error = %e, "Prefetch failed"),
            }
        }
        cached
    }

    /// Get cache statistics (for monitoring).
    pub fn entry_count(&self) -> u64 {
        self.profiles.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_all(&self) {
        self.profiles.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{LAUSANNE, MORGES, RENENS, date, sample_timetable};
    use crate::timetable::MemoryTimeTable;

    fn setup() -> (ProfileCache<MemoryTimeTable>, Router<MemoryTimeTable>) {
        (
            ProfileCache::new(&CacheConfig::default()),
            Router::new(sample_timetable()),
        )
    }

    #[test]
    fn default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(3600));
        assert_eq!(config.max_capacity, 64);
    }

    #[tokio::test]
    async fn computes_once_then_hits() {
        let (cache, router) = setup();
        assert!(cache.get(date(), MORGES).await.is_none());

        let first = cache.get_or_compute(&router, date(), MORGES).await.unwrap();
        let second = cache.get_or_compute(&router, date(), MORGES).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.for_station(LAUSANNE).unwrap().len(), 2);
        assert!(cache.get(date(), MORGES).await.is_some());
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let (cache, router) = setup();
        let err = cache.get_or_compute(&router, date(), 99).await.unwrap_err();
        assert!(matches!(*err, RouterError::UnknownStation(99)));
        assert!(cache.get(date(), 99).await.is_none());
    }

    #[tokio::test]
    async fn prefetch_counts_successes() {
        let (cache, router) = setup();
        let cached = cache.prefetch(&router, date(), &[MORGES, RENENS, 99]).await;
        assert_eq!(cached, 2);
        assert!(cache.get(date(), RENENS).await.is_some());

        cache.invalidate_all();
        assert!(cache.get(date(), RENENS).await.is_none());
    }
}
