//! # Store Errors
//!
//! Everything that can go wrong between the engine's writes and the
//! SQLite file.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  sqlx::Error ─────────┐                                                 │
//! │  MigrateError ────────┼──► DbError                                      │
//! │  serde_json::Error ───┤       │                                         │
//! │  CoreError (restore) ─┘       ├──► writer task: warn!, batch dropped    │
//! │                               │                                         │
//! │                               └──► startup: ApiError, terminal exits    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;
use till_core::CoreError;

#[derive(Debug, Error)]
pub enum DbError {
    /// The file could not be opened or created: bad path, permissions, or
    /// a closed pool.
    #[error("Cannot open store: {0}")]
    ConnectionFailed(String),

    #[error("Schema migration failed: {0}")]
    MigrationFailed(String),

    /// SQLite rejected a statement.
    #[error("Store query failed: {0}")]
    QueryFailed(String),

    /// A batch could not be committed; none of its writes landed.
    #[error("Write batch not committed: {0}")]
    TransactionFailed(String),

    /// No connection freed up before the acquire timeout.
    #[error("No store connection available")]
    PoolExhausted,

    /// A document body does not match the shape stored under its key.
    #[error("Document {key} is unreadable: {reason}")]
    Serialization { key: String, reason: String },

    /// Documents decoded but describe an engine state that cannot exist.
    #[error(transparent)]
    Corrupt(#[from] CoreError),

    #[error("Store error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn serialization(key: impl Into<String>, err: serde_json::Error) -> Self {
        DbError::Serialization {
            key: key.into(),
            reason: err.to_string(),
        }
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(e) => DbError::QueryFailed(e.message().to_string()),
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("store already closed".into()),
            sqlx::Error::Io(e) => DbError::ConnectionFailed(e.to_string()),
            sqlx::Error::Migrate(e) => DbError::MigrationFailed(e.to_string()),
            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_errors_map_to_connection_variants() {
        assert!(matches!(DbError::from(sqlx::Error::PoolTimedOut), DbError::PoolExhausted));
        assert!(matches!(
            DbError::from(sqlx::Error::PoolClosed),
            DbError::ConnectionFailed(_)
        ));
        assert!(matches!(DbError::from(sqlx::Error::RowNotFound), DbError::Internal(_)));
    }

    #[test]
    fn test_serialization_names_the_key() {
        let err = serde_json::from_str::<Vec<i64>>("{").unwrap_err();
        let msg = DbError::serialization("ledger", err).to_string();
        assert!(msg.starts_with("Document ledger is unreadable"));
    }
}
