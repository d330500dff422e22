//! Bulk loading of one feed file into one table.

use std::fs::File;
use std::path::Path;

use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info};

use super::ImportError;
use super::schema::{SAMPLE_ROWS, TableSchema, clean_headers, quote_ident};

/// Highest number of bound parameters SQLite accepts in one statement.
pub const SQLITE_MAX_PARAMS: usize = 32766;

type Row = Vec<Option<String>>;

/// Rows per INSERT statement for a table of `columns` columns.
pub fn rows_per_insert(batch_size: usize, columns: usize) -> usize {
    let cap = SQLITE_MAX_PARAMS / columns.max(1);
    batch_size.clamp(1, cap.max(1))
}

/// Convert a raw record into a row of exactly `width` values.
///
/// Invalid UTF-8 is replaced, empty values become NULL, missing trailing
/// values are NULL and extra values are dropped. Returns `None` for a blank
/// line.
fn to_row(record: &csv::ByteRecord, width: usize) -> Option<Row> {
    if record.iter().all(|field| field.iter().all(u8::is_ascii_whitespace)) {
        return None;
    }

    let mut row: Row = record
        .iter()
        .take(width)
        .map(|field| {
            let value = String::from_utf8_lossy(field);
            (!value.is_empty()).then(|| value.into_owned())
        })
        .collect();
    row.resize(width, None);
    Some(row)
}

/// Load `path` into `table`, replacing any existing table of that name.
///
/// Returns the number of rows inserted. The table is created and filled in
/// a single transaction.
pub async fn load_table(
    pool: &SqlitePool,
    path: &Path,
    table: &str,
    batch_size: usize,
) -> Result<u64, ImportError> {
    let file = File::open(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(file);

    let headers = {
        let raw = reader.byte_headers().map_err(|e| ImportError::csv(path, e))?;
        let decoded: Vec<String> = raw
            .iter()
            .map(|h| String::from_utf8_lossy(h).into_owned())
            .collect();
        clean_headers(decoded.iter().map(String::as_str))
    };
    if headers.iter().all(String::is_empty) {
        return Err(ImportError::EmptyFile(path.to_path_buf()));
    }
    let width = headers.len();

    let mut records = reader.into_byte_records();
    let mut sample: Vec<Row> = Vec::with_capacity(SAMPLE_ROWS);
    while sample.len() < SAMPLE_ROWS {
        match records.next() {
            Some(record) => {
                let record = record.map_err(|e| ImportError::csv(path, e))?;
                sample.extend(to_row(&record, width));
            }
            None => break,
        }
    }

    let schema = TableSchema::infer(table, &headers, &sample);
    debug!(table, columns = ?schema.columns, "inferred schema");

    let mut tx = pool.begin().await?;
    sqlx::query(&schema.drop_sql()).execute(&mut *tx).await?;
    sqlx::query(&schema.create_sql()).execute(&mut *tx).await?;

    let chunk = rows_per_insert(batch_size, width);
    let insert_prefix = format!("INSERT INTO {} ", quote_ident(table));
    let mut inserted: u64 = 0;
    let mut batch: Vec<Row> = Vec::with_capacity(chunk);

    let rest = records.filter_map(|record| match record {
        Ok(record) => to_row(&record, width).map(Ok),
        Err(e) => Some(Err(ImportError::csv(path, e))),
    });

    for row in sample.into_iter().map(Ok).chain(rest) {
        batch.push(row?);
        if batch.len() == chunk {
            inserted += insert_batch(&mut tx, &insert_prefix, &mut batch).await?;
        }
    }
    if !batch.is_empty() {
        inserted += insert_batch(&mut tx, &insert_prefix, &mut batch).await?;
    }

    tx.commit().await?;

    info!(table, rows = inserted, "imported {}", path.display());
    Ok(inserted)
}

/// Insert and drain `batch` with one multi-row INSERT.
async fn insert_batch(
    tx: &mut sqlx::Transaction<'_, Sqlite>,
    prefix: &str,
    batch: &mut Vec<Row>,
) -> Result<u64, ImportError> {
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(prefix);
    builder.push_values(batch.drain(..), |mut values, row| {
        for value in row {
            values.push_bind(value);
        }
    });

    let result = builder.build().execute(&mut **tx).await?;
    Ok(result.rows_affected())
}
