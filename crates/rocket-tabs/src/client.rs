//! Engine-facing callback targets
//!
//! An engine reports navigation through a [`ViewClient`] and window-level
//! requests through a [`ChromeClient`]. Every method has a do-nothing default
//! so an engine can always be given a client, even for a tab nobody listens to.

use std::rc::Rc;

use crate::engine::{
    FileChooserParams, FilePathCallback, FullscreenCallback, GeolocationCallback, HitTarget,
    ViewHandle, WindowTransport,
};

pub trait ViewClient {
    fn on_page_started(&self, _url: &str) {}

    fn on_page_finished(&self, _is_secure: bool) {}

    fn on_url_changed(&self, _url: &str) {}

    /// Returns `true` when the URL was dealt with outside the engine.
    fn handle_external_url(&self, _url: &str) -> bool {
        false
    }

    fn update_failing_url(&self, _url: &str, _update_from_error: bool) {}
}

pub trait ChromeClient {
    /// Returns `true` when a new window was supplied through `transport`.
    fn on_create_window(
        &self,
        _is_dialog: bool,
        _is_user_gesture: bool,
        _transport: Option<Box<dyn WindowTransport>>,
    ) -> bool {
        false
    }

    fn on_close_window(&self, _view: &ViewHandle) {}

    fn on_progress_changed(&self, _progress: i32) {}

    fn on_show_file_chooser(
        &self,
        _params: &FileChooserParams,
        _callback: Rc<dyn FilePathCallback>,
    ) -> bool {
        false
    }

    fn on_received_title(&self, _title: &str) {}

    fn on_long_press(&self, _hit_target: &HitTarget) {}

    fn on_enter_full_screen(&self, _callback: Rc<dyn FullscreenCallback>) {}

    fn on_exit_full_screen(&self) {}

    fn on_geolocation_permissions_show_prompt(
        &self,
        _origin: &str,
        _callback: Rc<dyn GeolocationCallback>,
    ) {
    }
}
