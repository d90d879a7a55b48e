//! Generation audit logging.
//!
//! [`GenerationLogStore`] is the persistence port (implemented with SQLite in
//! artistry-infra). [`GenerationLogger`] decouples callers from it: `record`
//! only enqueues, and a background task hands entries to the store. Store
//! failures are reported through `tracing` and never reach the caller.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{mpsc, oneshot};

use artistry_types::error::RepositoryError;
use artistry_types::log::{GenerationLogEntry, GenerationLogQuery};

/// Storage interface for generation history.
///
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait GenerationLogStore: Send + Sync {
    /// Persist one entry, keyed by its generation id.
    fn save(
        &self,
        entry: &GenerationLogEntry,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Entries matching `query`, newest first.
    fn query(
        &self,
        query: &GenerationLogQuery,
    ) -> impl Future<Output = Result<Vec<GenerationLogEntry>, RepositoryError>> + Send;
}

enum LogCommand {
    Record(Box<GenerationLogEntry>),
    Flush(oneshot::Sender<()>),
}

/// Fire-and-forget handle onto the log writer task.
#[derive(Clone)]
pub struct GenerationLogger {
    tx: mpsc::UnboundedSender<LogCommand>,
}

impl GenerationLogger {
    /// Start the writer task on the current tokio runtime.
    pub fn spawn<S: GenerationLogStore + 'static>(store: Arc<S>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<LogCommand>();

        tokio::spawn(async move {
            while let Some(command) = rx.recv().await {
                match command {
                    LogCommand::Record(entry) => {
                        if let Err(err) = store.save(&entry).await {
                            tracing::warn!(
                                generation_id = %entry.id,
                                operation = %entry.operation,
                                error = %err,
                                "failed to persist generation log entry"
                            );
                        }
                    }
                    LogCommand::Flush(done) => {
                        let _ = done.send(());
                    }
                }
            }
            tracing::debug!("generation log writer stopped");
        });

        Self { tx }
    }

    /// Queue an entry. Never blocks and never fails.
    pub fn record(&self, entry: GenerationLogEntry) {
        let id = entry.id;
        if self.tx.send(LogCommand::Record(Box::new(entry))).is_err() {
            tracing::warn!(generation_id = %id, "log writer is gone, dropping entry");
        }
    }

    /// Wait until everything queued before this call reached the store.
    pub async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        if self.tx.send(LogCommand::Flush(done)).is_ok() {
            let _ = wait.await;
        }
    }
}

impl std::fmt::Debug for GenerationLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationLogger")
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

/// In-memory store, for embedding without a database and for tests.
#[derive(Debug, Default)]
pub struct MemoryLogStore {
    entries: Mutex<Vec<GenerationLogEntry>>,
}

impl MemoryLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored entry in insertion order.
    pub fn entries(&self) -> Vec<GenerationLogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl GenerationLogStore for MemoryLogStore {
    fn save(
        &self,
        entry: &GenerationLogEntry,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry.clone());
        async { Ok(()) }
    }

    fn query(
        &self,
        query: &GenerationLogQuery,
    ) -> impl Future<Output = Result<Vec<GenerationLogEntry>, RepositoryError>> + Send {
        let mut matched: Vec<GenerationLogEntry> = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|entry| query.matches(entry))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = query.limit {
            matched.truncate(limit as usize);
        }
        async move { Ok(matched) }
    }
}
