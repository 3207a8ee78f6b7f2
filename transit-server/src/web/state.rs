//! Application state for the web layer.

use std::sync::Arc;

use crate::cache::{CacheConfig, ProfileCache};
use crate::profile::Router;
use crate::timetable::MemoryTimeTable;

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Timetable being served
    pub timetable: Arc<MemoryTimeTable>,

    /// Profile router over the timetable
    pub router: Router<MemoryTimeTable>,

    /// Computed profiles
    pub profiles: Arc<ProfileCache<MemoryTimeTable>>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(timetable: MemoryTimeTable, cache_config: &CacheConfig) -> Self {
        let timetable = Arc::new(timetable);
        Self {
            router: Router::new(Arc::clone(&timetable)),
            profiles: Arc::new(ProfileCache::new(cache_config)),
            timetable,
        }
    }
}
