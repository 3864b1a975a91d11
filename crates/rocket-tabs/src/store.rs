//! Persistence gateway
//!
//! The session hands snapshots to a [`TabModelStore`] and gets answers back
//! through single-shot completions. A completion always delivers its result
//! through the session's dispatcher, so listeners run on the session thread
//! no matter where the store did its work.

use parking_lot::Mutex;
use std::cell::Cell;
use std::sync::Arc;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;

use rocket_storage::{Database, StorageError, TabRecord};

use crate::notifier::{Message, RequestToken};
use crate::snapshot::TabSnapshot;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Request {0:?} was dropped without an answer")]
    Abandoned(RequestToken),
}

/// Asynchronous record store for tab snapshots.
pub trait TabModelStore {
    /// Replace the saved set with `snapshots`, in order.
    fn save_tabs(&self, snapshots: Vec<TabSnapshot>, completion: SaveCompletion);

    fn get_saved_tabs(&self, completion: QueryCompletion);
}

/// Answer slot for one save. Dropping it unanswered reports
/// [`StoreError::Abandoned`].
pub struct SaveCompletion {
    token: RequestToken,
    sender: Option<UnboundedSender<Message>>,
}

impl SaveCompletion {
    pub(crate) fn new(token: RequestToken, sender: UnboundedSender<Message>) -> Self {
        Self {
            token,
            sender: Some(sender),
        }
    }

    pub fn token(&self) -> RequestToken {
        self.token
    }

    pub fn complete(mut self, result: Result<(), StoreError>) {
        self.send(result);
    }

    fn send(&mut self, result: Result<(), StoreError>) {
        if let Some(sender) = self.sender.take() {
            let message = Message::SaveComplete {
                token: self.token,
                result,
            };
            if sender.send(message).is_err() {
                tracing::debug!(token = ?self.token, "Session gone before save completed");
            }
        }
    }
}

impl Drop for SaveCompletion {
    fn drop(&mut self) {
        let token = self.token;
        self.send(Err(StoreError::Abandoned(token)));
    }
}

/// Answer slot for one load of the saved set.
pub struct QueryCompletion {
    token: RequestToken,
    sender: Option<UnboundedSender<Message>>,
}

impl QueryCompletion {
    pub(crate) fn new(token: RequestToken, sender: UnboundedSender<Message>) -> Self {
        Self {
            token,
            sender: Some(sender),
        }
    }

    pub fn token(&self) -> RequestToken {
        self.token
    }

    pub fn complete(mut self, result: Result<Vec<TabSnapshot>, StoreError>) {
        self.send(result);
    }

    fn send(&mut self, result: Result<Vec<TabSnapshot>, StoreError>) {
        if let Some(sender) = self.sender.take() {
            let message = Message::QueryComplete {
                token: self.token,
                result,
            };
            if sender.send(message).is_err() {
                tracing::debug!(token = ?self.token, "Session gone before query completed");
            }
        }
    }
}

impl Drop for QueryCompletion {
    fn drop(&mut self) {
        let token = self.token;
        self.send(Err(StoreError::Abandoned(token)));
    }
}

/// [`TabModelStore`] backed by the SQLite `tabs` table.
///
/// With a runtime handle the work runs on tokio's blocking pool, otherwise
/// inline. Either way the answer arrives through the dispatcher.
pub struct DatabaseTabStore {
    db: Database,
    runtime: Option<Handle>,
    /// Generation handed to the most recent save request
    issued: Cell<u64>,
    /// Generation of the most recent save that reached the database
    committed: Arc<Mutex<u64>>,
}

impl DatabaseTabStore {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            runtime: None,
            issued: Cell::new(0),
            committed: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_runtime(db: Database, runtime: Handle) -> Self {
        Self {
            runtime: Some(runtime),
            ..Self::new(db)
        }
    }

    fn spawn<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        match &self.runtime {
            Some(runtime) => {
                runtime.spawn_blocking(job);
            }
            None => job(),
        }
    }
}

impl TabModelStore for DatabaseTabStore {
    fn save_tabs(&self, snapshots: Vec<TabSnapshot>, completion: SaveCompletion) {
        let generation = self.issued.get() + 1;
        self.issued.set(generation);

        let db = self.db.clone();
        let committed = Arc::clone(&self.committed);
        let records: Vec<TabRecord> = snapshots.into_iter().map(TabRecord::from).collect();

        self.spawn(move || {
            let mut committed = committed.lock();

            let result = if *committed > generation {
                tracing::debug!(generation, latest = *committed, "Skipping superseded save");
                Ok(())
            } else {
                match db.replace_tabs(&records) {
                    Ok(count) => {
                        *committed = generation;
                        tracing::info!(count, generation, "Saved tabs");
                        Ok(())
                    }
                    Err(e) => Err(StoreError::from(e)),
                }
            };

            drop(committed);
            completion.complete(result);
        });
    }

    fn get_saved_tabs(&self, completion: QueryCompletion) {
        let db = self.db.clone();

        self.spawn(move || {
            let result = db
                .load_tabs()
                .map(|records| records.into_iter().map(TabSnapshot::from).collect())
                .map_err(StoreError::from);

            completion.complete(result);
        });
    }
}
