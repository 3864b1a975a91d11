//! Rocket Storage Layer
//!
//! SQLite persistence for tab snapshots.
//! The whole snapshot set is replaced in one transaction on every save.

mod database;
mod error;
mod migrations;
mod records;

pub use database::Database;
pub use error::StorageError;
pub use records::TabRecord;

pub type Result<T> = std::result::Result<T, StorageError>;
