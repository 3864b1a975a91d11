//! Rocket Tabs
//!
//! Ordered tab sessions over an abstract view engine.
//! Engines are created lazily when a tab is hoisted, and engine events are
//! fanned out to session-level listeners with the originating tab attached.

mod adapter;
mod client;
mod engine;
mod error;
mod listener;
mod notifier;
mod session;
mod snapshot;
mod store;
mod tab;

#[cfg(test)]
mod testing;

pub use client::{ChromeClient, ViewClient};
pub use engine::{
    Download, DownloadCallback, FileChooserParams, FilePathCallback, FullscreenCallback,
    GeolocationCallback, HitTarget, HostContext, ViewEngine, ViewHandle, WindowTransport,
};
pub use error::SessionError;
pub use listener::{TabsChromeListener, TabsViewListener};
pub use notifier::RequestToken;
pub use session::{RestoreListener, SaveListener, TabsSession};
pub use snapshot::{TabId, TabSnapshot};
pub use store::{DatabaseTabStore, QueryCompletion, SaveCompletion, StoreError, TabModelStore};
pub use tab::Tab;

pub type Result<T> = std::result::Result<T, SessionError>;
