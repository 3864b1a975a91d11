//! Session error types

use thiserror::Error;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("No current tab to reuse for an empty URL")]
    NoCurrentTab,

    #[error("Persistence error: {0}")]
    Store(#[from] StoreError),
}
