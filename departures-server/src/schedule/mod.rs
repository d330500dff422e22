//! Read-only access to the static schedule.
//!
//! The departure search only ever asks two questions of the dataset: "which
//! stops exist" and "which trips call at these stops". [`ScheduleStore`]
//! captures exactly that, so the search can run against the SQLite dataset
//! in production and against in-memory fixtures in tests.

mod cache;
mod error;
mod memory;
mod sqlite;

use std::future::Future;
use std::sync::Arc;

use crate::domain::{Stop, StopVisit};

pub use cache::{CacheConfig, CachedScheduleStore};
pub use error::StoreError;
pub use memory::{InMemoryScheduleStore, InMemoryScheduleStoreBuilder};
pub use sqlite::SqliteScheduleStore;

/// Source of stops and stop visits.
///
/// Implementations own their connection lifecycle and must be safe for
/// concurrent read-only use.
pub trait ScheduleStore: Send + Sync {
    /// All stops in the dataset.
    fn stops(&self) -> impl Future<Output = Result<Arc<[Stop]>, StoreError>> + Send;

    /// Every visit by any trip to one of `stop_ids`, joined with trip and stop.
    ///
    /// Results are ordered by trip id, then by stop sequence ascending.
    fn stop_visits(
        &self,
        stop_ids: &[String],
    ) -> impl Future<Output = Result<Vec<StopVisit>, StoreError>> + Send;
}
