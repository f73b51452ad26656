//! # Store Connection
//!
//! Opens the SQLite file that backs the document store.
//!
//! ## Who Uses The Pool
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  DbConfig::new(path)                                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config) ──► open file ──► apply migrations               │
//! │       │                                                                 │
//! │       ├──► startup: documents().load_snapshot()   (reads, once)         │
//! │       │                                                                 │
//! │       └──► writer task: documents().apply(batch)  (one writer)          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A terminal has one reader at startup and one writer afterwards, so the
//! pool stays small. WAL journaling lets the two overlap while the writer
//! drains its first batches.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::store::DocumentStore;

// =============================================================================
// Configuration
// =============================================================================

/// Where the store lives and how it is opened.
///
/// ```rust,ignore
/// let config = DbConfig::new("/var/lib/till/till.db").pool_size(2);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// SQLite file; `None` keeps everything in memory.
    pub path: Option<PathBuf>,

    /// Upper bound on open connections.
    pub pool_size: u32,

    /// How long a caller waits for a free connection.
    pub acquire_timeout: Duration,

    /// How long SQLite retries a locked file before giving up.
    pub busy_timeout: Duration,

    /// Apply pending migrations when opening.
    pub migrate: bool,
}

impl DbConfig {
    /// Store file at `path`. The file and its parent must be writable.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            path: Some(path.into()),
            pool_size: 2,
            acquire_timeout: Duration::from_secs(10),
            busy_timeout: Duration::from_secs(5),
            migrate: true,
        }
    }

    /// Private in-memory store, gone when the `Database` is dropped.
    pub fn in_memory() -> Self {
        DbConfig {
            path: None,
            // Each in-memory connection would see its own empty database.
            pool_size: 1,
            acquire_timeout: Duration::from_secs(5),
            busy_timeout: Duration::from_secs(1),
            migrate: true,
        }
    }

    pub fn pool_size(mut self, size: u32) -> Self {
        self.pool_size = size.max(1);
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Opens without touching the schema.
    pub fn skip_migrations(mut self) -> Self {
        self.migrate = false;
        self
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let options = match &self.path {
            Some(path) => SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal),
            None => SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
                .journal_mode(SqliteJournalMode::Memory),
        };
        Ok(options
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(self.busy_timeout))
    }

    fn describe(&self) -> String {
        match &self.path {
            Some(path) => path.display().to_string(),
            None => "in-memory".to_string(),
        }
    }
}

// =============================================================================
// Database
// =============================================================================

/// Open store. Cloning shares the pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the store described by `config`, creating the file and the
    /// schema when they are missing.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        let location = config.describe();
        info!(location = %location, "Opening document store");

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.pool_size)
            .min_connections(1)
            .acquire_timeout(config.acquire_timeout);

        // The in-memory database lives only as long as its single connection.
        if config.path.is_none() {
            pool_options = pool_options
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>);
        }

        let pool = pool_options
            .connect_with(config.connect_options()?)
            .await
            .map_err(|e| DbError::ConnectionFailed(format!("{location}: {e}")))?;

        debug!(pool_size = config.pool_size, "Store pool ready");

        let db = Database { pool };
        if config.migrate {
            db.run_migrations().await?;
        }
        Ok(db)
    }

    /// Brings the schema up to date.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await?;
        let (total, applied) = migrations::migration_status(&self.pool).await?;
        debug!(total, applied, "Schema up to date");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Keyed document access over this pool.
    pub fn documents(&self) -> DocumentStore {
        DocumentStore::new(self.pool.clone())
    }

    /// Waits for in-flight queries, then closes every connection.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Document store closed");
    }

    /// True when a trivial query round-trips.
    pub async fn health_check(&self) -> bool {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_store_is_migrated() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert!(db.health_check().await);

        let (total, applied) = migrations::migration_status(db.pool()).await.unwrap();
        assert_eq!(total, applied);
        assert_eq!(db.documents().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_file_store_survives_reopen() {
        let path = std::env::temp_dir().join(format!("till-pool-{}.db", std::process::id()));
        let _ = std::fs::remove_file(&path);

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        db.documents()
            .save(till_core::StoreKey::Catalog, &Vec::<till_core::Product>::new())
            .await
            .unwrap();
        db.close().await;

        let reopened = Database::new(DbConfig::new(&path).skip_migrations())
            .await
            .unwrap();
        assert_eq!(reopened.documents().count().await.unwrap(), 1);
        reopened.close().await;

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_config_builder() {
        let config = DbConfig::new("/tmp/till.db")
            .pool_size(0)
            .busy_timeout(Duration::from_millis(250))
            .skip_migrations();

        assert_eq!(config.pool_size, 1);
        assert_eq!(config.busy_timeout, Duration::from_millis(250));
        assert!(!config.migrate);
        assert_eq!(config.describe(), "/tmp/till.db");
        assert_eq!(DbConfig::in_memory().describe(), "in-memory");
    }
}
