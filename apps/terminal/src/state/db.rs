//! # Database State
//!
//! Owns the `Database` and the single background writer that persists the
//! engine's writes.
//!
//! ## Write Queue
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  command ──► persist(writes) ──► mpsc ──► writer task                   │
//! │   (returns at once)                          │                          │
//! │                                              ▼                          │
//! │                               DocumentStore::apply(batch)               │
//! │                               one transaction per batch, in order       │
//! │                                              │                          │
//! │                                   Err ──► warn!, keep going            │
//! │                                                                         │
//! │  flush().await ──► Flush(oneshot) ──► answered once earlier             │
//! │                                       batches are applied               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The in-memory engine stays authoritative. A failed batch is logged and
//! never reported to the operator.

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use till_core::Write;
use till_db::{Database, DocumentStore};

enum Job {
    Apply(Vec<Write>),
    Flush(oneshot::Sender<()>),
}

impl std::fmt::Debug for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Job::Apply(writes) => write!(f, "Apply({} writes)", writes.len()),
            Job::Flush(_) => f.write_str("Flush"),
        }
    }
}

/// Database handle plus the writer queue.
#[derive(Debug, Clone)]
pub struct DbState {
    db: Database,
    queue: mpsc::UnboundedSender<Job>,
}

impl DbState {
    /// Wraps the database and spawns the writer task.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(db: Database) -> Self {
        let (queue, jobs) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(db.documents(), jobs));
        info!("Persistence writer started");
        DbState { db, queue }
    }

    /// Returns a reference to the inner Database.
    pub fn inner(&self) -> &Database {
        &self.db
    }

    /// Queues writes for the background writer. Never blocks.
    pub fn persist(&self, writes: Vec<Write>) {
        if writes.is_empty() {
            return;
        }
        if self.queue.send(Job::Apply(writes)).is_err() {
            warn!("Persistence writer has stopped; writes dropped");
        }
    }

    /// Waits until every batch queued before this call has been applied.
    pub async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        if self.queue.send(Job::Flush(done)).is_err() {
            warn!("Persistence writer has stopped; nothing to flush");
            return;
        }
        let _ = wait.await;
    }
}

async fn run_writer(store: DocumentStore, mut jobs: mpsc::UnboundedReceiver<Job>) {
    while let Some(job) = jobs.recv().await {
        match job {
            Job::Apply(writes) => {
                let keys: Vec<&str> = writes.iter().map(|w| w.key().as_str()).collect();
                match store.apply(&writes).await {
                    Ok(()) => debug!(?keys, "Writes persisted"),
                    Err(e) => warn!(error = %e, ?keys, "Persisting writes failed"),
                }
            }
            Job::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    debug!("Persistence writer stopped");
}
