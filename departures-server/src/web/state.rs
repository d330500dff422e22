//! Application state for the web layer.

use std::sync::Arc;

use crate::schedule::ScheduleStore;
use crate::search::SearchConfig;

/// Shared application state.
///
/// Contains everything needed to handle requests.
pub struct AppState<S> {
    /// Schedule store searches run against
    pub store: Arc<S>,

    /// Search defaults
    pub config: Arc<SearchConfig>,

    /// The one city this deployment serves, lowercase
    pub city: Arc<str>,
}

// Derived Clone would require `S: Clone`
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            config: self.config.clone(),
            city: self.city.clone(),
        }
    }
}

impl<S: ScheduleStore> AppState<S> {
    /// Create a new app state.
    pub fn new(store: S, config: SearchConfig, city: &str) -> Self {
        Self {
            store: Arc::new(store),
            config: Arc::new(config),
            city: city.to_lowercase().into(),
        }
    }

    /// Whether `city` names the served city, ignoring case.
    pub fn serves(&self, city: &str) -> bool {
        city.to_lowercase() == *self.city
    }
}
