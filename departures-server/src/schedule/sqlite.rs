//! SQLite-backed schedule store.
//!
//! Reads the tables written by [`crate::import`]. Column types in the dataset
//! are inferred at import time, so every selected column is cast to the type
//! the domain expects and then mapped into typed records here. Nothing past
//! this module sees a raw row.

use std::path::Path;
use std::sync::Arc;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::debug;

use crate::domain::{Coordinate, ServiceTime, Stop, StopVisit};

use super::{ScheduleStore, StoreError};

const STOPS_QUERY: &str = "SELECT CAST(stop_id AS TEXT), CAST(stop_name AS TEXT), \
     CAST(stop_lat AS REAL), CAST(stop_lon AS REAL) FROM stops";

type StopRow = (String, Option<String>, f64, f64);

type VisitRow = (
    String,
    String,
    Option<String>,
    String,
    Option<String>,
    f64,
    f64,
    i64,
    String,
    String,
);

/// Schedule store reading from a SQLite dataset through a read-only pool.
#[derive(Debug, Clone)]
pub struct SqliteScheduleStore {
    pool: SqlitePool,
}

impl SqliteScheduleStore {
    /// Open the dataset at `path` read-only.
    pub async fn open(path: impl AsRef<Path>, max_connections: u32) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .read_only(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(Self { pool })
    }

}

/// Visits to `stop_count` stops, joined with their trip and stop.
///
/// The filter compares the raw `stop_id` column so the lookup can use
/// `idx_stop_times_stop_id`; bound ids take on the column's affinity.
fn visits_query(stop_count: usize) -> String {
    let placeholders = vec!["?"; stop_count].join(",");
    format!(
        "SELECT CAST(st.trip_id AS TEXT), CAST(t.route_id AS TEXT), CAST(t.trip_headsign AS TEXT), \
                CAST(st.stop_id AS TEXT), CAST(s.stop_name AS TEXT), \
                CAST(s.stop_lat AS REAL), CAST(s.stop_lon AS REAL), \
                CAST(st.stop_sequence AS INTEGER), \
                CAST(st.arrival_time AS TEXT), CAST(st.departure_time AS TEXT) \
         FROM stop_times st \
         JOIN trips t ON st.trip_id = t.trip_id \
         JOIN stops s ON st.stop_id = s.stop_id \
         WHERE st.stop_id IN ({placeholders}) \
         ORDER BY 1, 8"
    )
}

impl ScheduleStore for SqliteScheduleStore {
    async fn stops(&self) -> Result<Arc<[Stop]>, StoreError> {
        let rows: Vec<StopRow> = sqlx::query_as(STOPS_QUERY).fetch_all(&self.pool).await?;

        debug!(count = rows.len(), "loaded stops");

        Ok(rows
            .into_iter()
            .map(|(id, name, lat, lon)| {
                Stop::new(id, name.unwrap_or_default(), Coordinate::new(lat, lon))
            })
            .collect())
    }

    async fn stop_visits(&self, stop_ids: &[String]) -> Result<Vec<StopVisit>, StoreError> {
        if stop_ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = visits_query(stop_ids.len());
        let mut query = sqlx::query_as::<_, VisitRow>(&sql);
        for id in stop_ids {
            query = query.bind(id);
        }
        let rows = query.fetch_all(&self.pool).await?;

        debug!(stops = stop_ids.len(), rows = rows.len(), "loaded stop visits");

        rows.into_iter().map(visit_from_row).collect()
    }
}

/// Map a joined stop_times row into a typed visit.
fn visit_from_row(row: VisitRow) -> Result<StopVisit, StoreError> {
    let (
        trip_id,
        route_id,
        headsign,
        stop_id,
        stop_name,
        lat,
        lon,
        stop_sequence,
        arrival,
        departure,
    ) = row;

    let corrupt = |reason: String| StoreError::CorruptRow {
        table: "stop_times",
        reason,
    };

    let stop_sequence = u32::try_from(stop_sequence)
        .map_err(|_| corrupt(format!("stop_sequence {stop_sequence} out of range")))?;
    let arrival = ServiceTime::parse(&arrival).map_err(|e| corrupt(e.to_string()))?;
    let departure = ServiceTime::parse(&departure).map_err(|e| corrupt(e.to_string()))?;

    Ok(StopVisit {
        trip_id,
        route_id,
        headsign: headsign.unwrap_or_default(),
        stop_id,
        stop_name: stop_name.unwrap_or_default(),
        coordinate: Coordinate::new(lat, lon),
        stop_sequence,
        arrival,
        departure,
    })
}
