//! Dataset import.
//!
//! Loads the stop, trip and stop time files of a GTFS feed into a SQLite
//! database that [`crate::schedule::SqliteScheduleStore`] can serve from.
//! Each file becomes a table named after it, with column types inferred
//! from a sample of its rows. Tables are dropped and recreated, so an import
//! replaces whatever the database held before and must not run while a
//! server is reading the same file.

mod loader;
mod schema;

use std::path::{Path, PathBuf};

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::{info, warn};

pub use loader::{SQLITE_MAX_PARAMS, load_table, rows_per_insert};
pub use schema::{Column, ColumnType, SAMPLE_ROWS, TableSchema, clean_headers};

/// Default number of rows per INSERT.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Feed files read by the import and the table each one is loaded into.
pub const FEED_FILES: [(&str, &str); 3] = [
    ("stops.txt", "stops"),
    ("trips.txt", "trips"),
    ("stop_times.txt", "stop_times"),
];

/// Lookup indexes created after loading: (name, table, columns).
const INDEXES: [(&str, &str, &str); 5] = [
    ("idx_stops_stop_id", "stops", "stop_id"),
    ("idx_trips_trip_id", "trips", "trip_id"),
    ("idx_stop_times_trip_id", "stop_times", "trip_id"),
    ("idx_stop_times_stop_id", "stop_times", "stop_id"),
    ("idx_stops_coords", "stops", "stop_lat, stop_lon"),
];

/// Error from dataset import.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{} has no header row", .0.display())]
    EmptyFile(PathBuf),
}

impl ImportError {
    pub(crate) fn csv(path: &Path, source: csv::Error) -> Self {
        ImportError::Csv {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Outcome of an import run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Rows loaded per table, in import order.
    pub tables: Vec<(String, u64)>,

    /// Feed files that were not found.
    pub skipped: Vec<String>,

    /// Indexes that were created.
    pub indexes: usize,
}

impl ImportSummary {
    /// Rows loaded into `table`, if it was imported.
    pub fn rows(&self, table: &str) -> Option<u64> {
        self.tables
            .iter()
            .find(|(name, _)| name == table)
            .map(|(_, rows)| *rows)
    }

    pub fn total_rows(&self) -> u64 {
        self.tables.iter().map(|(_, rows)| rows).sum()
    }
}

/// Open (creating if needed) a database for writing.
pub async fn open_for_import(path: &Path) -> Result<SqlitePool, ImportError> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);

    Ok(SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?)
}

/// Import the feed in `gtfs_dir` into the database at `database`.
pub async fn import_gtfs(
    gtfs_dir: &Path,
    database: &Path,
    batch_size: usize,
) -> Result<ImportSummary, ImportError> {
    let pool = open_for_import(database).await?;
    let summary = import_into(&pool, gtfs_dir, batch_size).await;
    pool.close().await;
    summary
}

/// Import the feed in `gtfs_dir` through an open pool.
pub async fn import_into(
    pool: &SqlitePool,
    gtfs_dir: &Path,
    batch_size: usize,
) -> Result<ImportSummary, ImportError> {
    let mut summary = ImportSummary::default();

    for (file, table) in FEED_FILES {
        let path = gtfs_dir.join(file);
        if !path.is_file() {
            warn!("{} not found, skipping", path.display());
            summary.skipped.push(file.to_string());
            continue;
        }

        let rows = load_table(pool, &path, table, batch_size).await?;
        summary.tables.push((table.to_string(), rows));
    }

    summary.indexes = create_indexes(pool).await;

    info!(
        tables = summary.tables.len(),
        rows = summary.total_rows(),
        indexes = summary.indexes,
        "import finished"
    );
    Ok(summary)
}

/// Create the lookup indexes, skipping any that fail.
///
/// Returns how many were created.
async fn create_indexes(pool: &SqlitePool) -> usize {
    let mut created = 0;

    for (name, table, columns) in INDEXES {
        let sql = format!("CREATE INDEX IF NOT EXISTS {name} ON {table}({columns})");
        match sqlx::query(&sql).execute(pool).await {
            Ok(_) => created += 1,
            Err(e) => warn!(index = name, error = %e, "skipped index"),
        }
    }

    created
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use crate::domain::{Coordinate, format_utc};
    use crate::schedule::{ScheduleStore, SqliteScheduleStore};
    use crate::search::{SearchConfig, SearchRequest, search};

    const STOPS: &str = "\u{feff}stop_id,stop_code,stop_name,stop_lat,stop_lon\n\
        100,11,Rynek,51.1009,17.0000\n\
        200,12,Plac Grunwaldzki,51.1081,17.0000\n\
        300,13,Krzyki,51.0500,17.0000\n";

    const TRIPS: &str = "route_id,service_id,trip_id,trip_headsign,direction_id\n\
        A,6,3_100,Biskupin,0\n\
        A,6,3_101,Krzyki,1\n\
        \n\
        10,6,3_200,,0\n";

    const STOP_TIMES: &str = "trip_id,arrival_time,departure_time,stop_id,stop_sequence\n\
        3_100,08:10:00,08:10:00,100,1\n\
        3_100,08:14:00,08:15:00,200,2\n\
        3_101,08:05:00,08:05:00,200,1\n\
        3_101,08:09:00,08:09:00,100,2\n\
        3_200,24:40:00,24:41:00,100,4\n\
        3_200,24:50:00,24:50:00,200,5\n";

    fn write_feed(dir: &Path) {
        fs::write(dir.join("stops.txt"), STOPS).unwrap();
        fs::write(dir.join("trips.txt"), TRIPS).unwrap();
        fs::write(dir.join("stop_times.txt"), STOP_TIMES).unwrap();
    }

    async fn column_types(pool: &SqlitePool, table: &str) -> Vec<(String, String)> {
        sqlx::query_as(&format!("SELECT name, type FROM pragma_table_info('{table}')"))
            .fetch_all(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn imports_feed_tables() {
        let feed = tempfile::tempdir().unwrap();
        write_feed(feed.path());
        let db = feed.path().join("transit.db");

        let summary = import_gtfs(feed.path(), &db, 2).await.unwrap();

        assert_eq!(summary.rows("stops"), Some(3));
        assert_eq!(summary.rows("trips"), Some(3));
        assert_eq!(summary.rows("stop_times"), Some(6));
        assert_eq!(summary.total_rows(), 12);
        assert!(summary.skipped.is_empty());
        assert_eq!(summary.indexes, 5);
    }

    #[tokio::test]
    async fn infers_types_and_strips_bom() {
        let feed = tempfile::tempdir().unwrap();
        write_feed(feed.path());
        let pool = open_for_import(&feed.path().join("transit.db")).await.unwrap();

        import_into(&pool, feed.path(), DEFAULT_BATCH_SIZE).await.unwrap();

        let stops = column_types(&pool, "stops").await;
        let expected: Vec<(String, String)> = [
            ("stop_id", "INTEGER"),
            ("stop_code", "INTEGER"),
            ("stop_name", "TEXT"),
            ("stop_lat", "REAL"),
            ("stop_lon", "REAL"),
        ]
        .iter()
        .map(|(n, t)| (n.to_string(), t.to_string()))
        .collect();
        assert_eq!(stops, expected);

        let trip_types = column_types(&pool, "trips").await;
        assert_eq!(trip_types[2], ("trip_id".to_string(), "TEXT".to_string()));
    }

    #[tokio::test]
    async fn empty_values_stored_as_null() {
        let feed = tempfile::tempdir().unwrap();
        write_feed(feed.path());
        let pool = open_for_import(&feed.path().join("transit.db")).await.unwrap();

        import_into(&pool, feed.path(), DEFAULT_BATCH_SIZE).await.unwrap();

        let (nulls,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM trips WHERE trip_headsign IS NULL")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(nulls, 1);
    }

    #[tokio::test]
    async fn reimport_replaces_tables() {
        let feed = tempfile::tempdir().unwrap();
        write_feed(feed.path());
        let db = feed.path().join("transit.db");

        import_gtfs(feed.path(), &db, DEFAULT_BATCH_SIZE).await.unwrap();
        let summary = import_gtfs(feed.path(), &db, DEFAULT_BATCH_SIZE).await.unwrap();

        assert_eq!(summary.rows("stop_times"), Some(6));
        let pool = open_for_import(&db).await.unwrap();
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM stop_times")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 6);
    }

    #[tokio::test]
    async fn missing_files_are_skipped() {
        let feed = tempfile::tempdir().unwrap();
        fs::write(feed.path().join("stops.txt"), STOPS).unwrap();
        let db = feed.path().join("transit.db");

        let summary = import_gtfs(feed.path(), &db, DEFAULT_BATCH_SIZE).await.unwrap();

        assert_eq!(summary.rows("stops"), Some(3));
        assert_eq!(summary.rows("trips"), None);
        assert_eq!(summary.skipped, vec!["trips.txt", "stop_times.txt"]);
        // Only the two indexes on stops can be built
        assert_eq!(summary.indexes, 2);
    }

    #[tokio::test]
    async fn empty_file_is_an_error() {
        let feed = tempfile::tempdir().unwrap();
        fs::write(feed.path().join("stops.txt"), "").unwrap();
        let db = feed.path().join("transit.db");

        let err = import_gtfs(feed.path(), &db, DEFAULT_BATCH_SIZE)
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::EmptyFile(_)));
    }

    #[tokio::test]
    async fn imported_feed_serves_searches() {
        let feed = tempfile::tempdir().unwrap();
        write_feed(feed.path());
        let db = feed.path().join("transit.db");
        import_gtfs(feed.path(), &db, DEFAULT_BATCH_SIZE).await.unwrap();

        let store = SqliteScheduleStore::open(&db, 2).await.unwrap();
        assert_eq!(store.stops().await.unwrap().len(), 3);

        let start_time = chrono::NaiveDate::from_ymd_opt(2025, 4, 2)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let request = SearchRequest::new(
            Coordinate::new(51.1000, 17.0000),
            Coordinate::new(51.2000, 17.0000),
            start_time,
            &SearchConfig::default(),
        );

        let departures = search(&store, &request).await.unwrap();

        // 3_101 heads south and is dropped
        let trips: Vec<&str> = departures.iter().map(|d| d.trip_id.as_str()).collect();
        assert_eq!(trips, vec!["3_100", "3_200"]);
        assert_eq!(departures[0].stop.name, "Rynek");
        assert_eq!(departures[0].headsign, "Biskupin");
        assert_eq!(departures[1].headsign, "");
        assert_eq!(
            format_utc(&departures[1].stop.departure),
            "2025-04-03T00:41:00Z"
        );
    }
}
