//! View-engine capability
//!
//! The rendering engine is a black box. A tab only ever talks to it through
//! [`ViewEngine`], and only a [`HostContext`] can produce one.

use std::rc::Rc;

use crate::client::{ChromeClient, ViewClient};

/// Shared handle to a live engine instance.
pub type ViewHandle = Rc<dyn ViewEngine>;

/// Operations the session needs from a rendering engine.
///
/// Engines are driven from a single thread and may call back into the
/// installed clients from inside any of these methods.
pub trait ViewEngine {
    fn load_url(&self, url: &str);

    fn title(&self) -> String;

    fn url(&self) -> String;

    /// Serialize the engine's navigation state into an opaque blob.
    fn save_view_state(&self) -> Vec<u8>;

    fn restore_view_state(&self, state: &[u8]);

    fn set_view_client(&self, client: Option<Rc<dyn ViewClient>>);

    fn set_chrome_client(&self, client: Option<Rc<dyn ChromeClient>>);

    fn set_download_callback(&self, callback: Option<Rc<dyn DownloadCallback>>);

    fn set_blocking_enabled(&self, enabled: bool);

    fn on_pause(&self);

    fn on_resume(&self);

    /// Whether the view is currently inside a parent container.
    fn is_attached(&self) -> bool;

    /// Remove the view from its parent container.
    fn detach(&self);

    /// Drop page-level resources before [`ViewEngine::destroy`].
    fn cleanup(&self);

    fn destroy(&self);
}

/// Supplies engine instances bound to the host window.
pub trait HostContext {
    fn create_view_engine(&self) -> ViewHandle;
}

/// Hand-off slot for a window-open request. The opener's engine receives the
/// new view through it.
pub trait WindowTransport {
    fn attach(self: Box<Self>, view: ViewHandle);
}

/// A download request reported by an engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub url: String,
    pub user_agent: Option<String>,
    pub content_disposition: Option<String>,
    pub mime_type: Option<String>,
    pub content_length: Option<u64>,
}

pub trait DownloadCallback {
    fn on_download_start(&self, download: &Download);
}

/// What was under the finger on a long press.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HitTarget {
    pub link_url: Option<String>,
    pub image_url: Option<String>,
}

impl HitTarget {
    pub fn is_link(&self) -> bool {
        self.link_url.is_some()
    }

    pub fn is_image(&self) -> bool {
        self.image_url.is_some()
    }
}

/// Lets an observer leave fullscreen on the engine's behalf.
pub trait FullscreenCallback {
    fn full_screen_exited(&self);
}

/// Answer to a geolocation permission prompt.
pub trait GeolocationCallback {
    fn invoke(&self, origin: &str, allow: bool, retain: bool);
}

/// Receives the files picked for a file-chooser request. `None` cancels.
pub trait FilePathCallback {
    fn on_receive_value(&self, paths: Option<Vec<String>>);
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileChooserParams {
    pub accept_types: Vec<String>,
    pub allow_multiple: bool,
    pub capture: bool,
}
