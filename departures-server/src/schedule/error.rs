//! Schedule store error types.

/// Errors from a schedule store.
///
/// These are collaborator failures: the search propagates them instead of
/// returning partial or empty results.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// The backing store could not be reached
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A query was rejected or failed while running
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// A row could not be mapped into a typed record
    #[error("corrupt row in {table}: {reason}")]
    CorruptRow { table: &'static str, reason: String },
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(err.to_string())
            }
            _ => StoreError::QueryFailed(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = StoreError::Unavailable("pool closed".into());
        assert_eq!(err.to_string(), "store unavailable: pool closed");

        let err = StoreError::QueryFailed("no such table: stops".into());
        assert_eq!(err.to_string(), "query failed: no such table: stops");

        let err = StoreError::CorruptRow {
            table: "stop_times",
            reason: "invalid time: expected HH:MM:SS format".into(),
        };
        assert_eq!(
            err.to_string(),
            "corrupt row in stop_times: invalid time: expected HH:MM:SS format"
        );
    }

    #[test]
    fn from_sqlx_pool_closed_is_unavailable() {
        let err = StoreError::from(sqlx::Error::PoolClosed);
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[test]
    fn from_sqlx_row_not_found_is_query_failure() {
        let err = StoreError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::QueryFailed(_)));
    }
}
