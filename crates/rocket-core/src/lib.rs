//! Rocket Core
//!
//! Wires configuration, storage and the tabs session into one browser.

mod browser;
mod config;
mod error;

pub use browser::Browser;
pub use config::Config;
pub use error::CoreError;

pub use rocket_storage::{Database, StorageError};
pub use rocket_tabs::{
    HostContext, SessionError, StoreError, Tab, TabId, TabsChromeListener, TabsSession,
    TabsViewListener, ViewEngine, ViewHandle,
};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
