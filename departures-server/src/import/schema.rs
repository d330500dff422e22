//! Table schema inference for imported feed files.

use std::fmt;

/// Number of data rows sampled per file when inferring column types.
pub const SAMPLE_ROWS: usize = 100;

const BOM: char = '\u{feff}';

/// SQLite storage class chosen for an imported column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
}

impl ColumnType {
    /// Classify a single non-empty value.
    fn of_value(value: &str) -> Self {
        let value = value.trim();
        if value.parse::<i64>().is_ok() {
            ColumnType::Integer
        } else if value.parse::<f64>().is_ok_and(f64::is_finite) {
            ColumnType::Real
        } else {
            ColumnType::Text
        }
    }

    /// Widen `self` to also hold values of `other`.
    fn widen(self, other: ColumnType) -> ColumnType {
        use ColumnType::*;
        match (self, other) {
            (Text, _) | (_, Text) => Text,
            (Real, _) | (_, Real) => Real,
            (Integer, Integer) => Integer,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
        })
    }
}

/// A named, typed column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnType,
}

/// Column layout of one imported table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub table: String,
    pub columns: Vec<Column>,
}

impl TableSchema {
    /// Infer a schema from the header and a sample of data rows.
    ///
    /// Empty values carry no type information. A column with no non-empty
    /// sample is stored as text.
    pub fn infer<R: AsRef<[Option<String>]>>(table: &str, headers: &[String], sample: &[R]) -> Self {
        let columns = headers
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let kind = sample
                    .iter()
                    .filter_map(|row| row.as_ref().get(i).and_then(|v| v.as_deref()))
                    .map(ColumnType::of_value)
                    .reduce(ColumnType::widen)
                    .unwrap_or(ColumnType::Text);

                Column {
                    name: name.clone(),
                    kind,
                }
            })
            .collect();

        Self {
            table: table.to_string(),
            columns,
        }
    }

    pub fn drop_sql(&self) -> String {
        format!("DROP TABLE IF EXISTS {}", quote_ident(&self.table))
    }

    pub fn create_sql(&self) -> String {
        let columns: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("{} {}", quote_ident(&c.name), c.kind))
            .collect();

        format!(
            "CREATE TABLE {} ({})",
            quote_ident(&self.table),
            columns.join(", ")
        )
    }
}

/// Clean up header names read from a feed file.
///
/// Removes a byte-order mark left on the first header and surrounding
/// whitespace on all of them.
pub fn clean_headers<'a>(raw: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    raw.into_iter()
        .map(|h| h.trim_start_matches(BOM).trim().to_string())
        .collect()
}

/// Quote an SQL identifier.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
