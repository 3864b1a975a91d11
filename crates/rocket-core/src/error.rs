//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] rocket_storage::StorageError),

    #[error("Session error: {0}")]
    Session(#[from] rocket_tabs::SessionError),

    #[error("Persistence error: {0}")]
    Store(#[from] rocket_tabs::StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}
