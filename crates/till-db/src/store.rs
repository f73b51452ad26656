//! # Document Store
//!
//! Key-value persistence for the engine's documents.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  engine command ──► Outcome { writes: [Put(ledger), Put(catalog), ..] } │
//! │                                     │                                   │
//! │                                     ▼                                   │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   SINGLE TRANSACTION                            │   │
//! │  │                                                                 │   │
//! │  │  Put(doc)     → INSERT .. ON CONFLICT(key) DO UPDATE            │   │
//! │  │  Delete(key)  → DELETE FROM documents WHERE key = ?             │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                     │                                   │
//! │                                     ▼                                   │
//! │  COMMIT ← a checkout's ledger, catalog and shift land together         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use till_core::{Snapshot, StoreKey, Write};

const UPSERT: &str = r#"
    INSERT INTO documents (key, body, updated_at)
    VALUES (?1, ?2, ?3)
    ON CONFLICT(key) DO UPDATE SET
        body = excluded.body,
        updated_at = excluded.updated_at
"#;

const DELETE: &str = "DELETE FROM documents WHERE key = ?1";

/// Repository for engine documents.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    pool: SqlitePool,
}

impl DocumentStore {
    pub fn new(pool: SqlitePool) -> Self {
        DocumentStore { pool }
    }

    /// Loads and decodes a document. `None` if nothing is stored under `key`.
    pub async fn load<T: DeserializeOwned>(&self, key: StoreKey) -> DbResult<Option<T>> {
        let body: Option<String> = sqlx::query_scalar("SELECT body FROM documents WHERE key = ?1")
            .bind(key.as_str())
            .fetch_optional(&self.pool)
            .await?;

        body.map(|body| serde_json::from_str(&body))
            .transpose()
            .map_err(|e| DbError::serialization(key.as_str(), e))
    }

    /// Stores a document, replacing whatever was under `key`.
    pub async fn save<T: Serialize>(&self, key: StoreKey, doc: &T) -> DbResult<()> {
        let body = serde_json::to_string(doc).map_err(|e| DbError::serialization(key.as_str(), e))?;

        sqlx::query(UPSERT)
            .bind(key.as_str())
            .bind(body)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        debug!(key = %key, "Document saved");
        Ok(())
    }

    /// Deletes the document under `key`, if any.
    pub async fn remove(&self, key: StoreKey) -> DbResult<()> {
        sqlx::query(DELETE)
            .bind(key.as_str())
            .execute(&self.pool)
            .await?;

        debug!(key = %key, "Document removed");
        Ok(())
    }

    /// Applies a batch of writes in one transaction, in order.
    pub async fn apply(&self, writes: &[Write]) -> DbResult<()> {
        if writes.is_empty() {
            return Ok(());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        let now = Utc::now();

        for write in writes {
            match write {
                Write::Put(doc) => {
                    let key = doc.key();
                    let body = doc
                        .to_json()
                        .map_err(|e| DbError::serialization(key.as_str(), e))?;

                    sqlx::query(UPSERT)
                        .bind(key.as_str())
                        .bind(body)
                        .bind(now)
                        .execute(&mut *tx)
                        .await?;
                }
                Write::Delete(key) => {
                    sqlx::query(DELETE)
                        .bind(key.as_str())
                        .execute(&mut *tx)
                        .await?;
                }
            }
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        debug!(count = writes.len(), "Write batch committed");
        Ok(())
    }

    /// Reads every engine document. Missing documents come back empty.
    pub async fn load_snapshot(&self) -> DbResult<Snapshot> {
        Ok(Snapshot {
            catalog: self.load(StoreKey::Catalog).await?.unwrap_or_default(),
            ledger: self.load(StoreKey::Ledger).await?.unwrap_or_default(),
            shift_current: self.load(StoreKey::ShiftCurrent).await?,
            shift_history: self.load(StoreKey::ShiftHistory).await?.unwrap_or_default(),
            session_user: self.load(StoreKey::SessionUser).await?,
        })
    }

    /// Number of stored documents.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
