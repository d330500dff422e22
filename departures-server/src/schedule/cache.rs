//! Caching layer for schedule store reads.
//!
//! The dataset does not change while the server runs, yet every search starts
//! by scanning the full stop list. We cache that list so the spatial filter
//! runs against memory. Stop visits depend on the query and pass through.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::debug;

use crate::domain::{Stop, StopVisit};

use super::{ScheduleStore, StoreError};

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for the cached stop list.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60 * 60),
            max_capacity: 1,
        }
    }
}

/// Schedule store with a cached stop list.
///
/// Wraps any [`ScheduleStore`]. Failed reads are not cached.
pub struct CachedScheduleStore<S> {
    inner: S,
    stops: MokaCache<(), Arc<[Stop]>>,
}

impl<S: ScheduleStore> CachedScheduleStore<S> {
    /// Create a new cached store.
    pub fn new(inner: S, config: &CacheConfig) -> Self {
        let stops = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { inner, stops }
    }

    /// Access the underlying store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Get cache statistics.
    pub fn cache_entry_count(&self) -> u64 {
        self.stops.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_cache(&self) {
        self.stops.invalidate_all();
    }
}

impl<S: ScheduleStore> ScheduleStore for CachedScheduleStore<S> {
    async fn stops(&self) -> Result<Arc<[Stop]>, StoreError> {
        // Try cache first
        if let Some(cached) = self.stops.get(&()).await {
            return Ok(cached);
        }

        let stops = self.inner.stops().await?;
        debug!(count = stops.len(), "caching stop list");
        self.stops.insert((), stops.clone()).await;

        Ok(stops)
    }

    async fn stop_visits(&self, stop_ids: &[String]) -> Result<Vec<StopVisit>, StoreError> {
        self.inner.stop_visits(stop_ids).await
    }
}
