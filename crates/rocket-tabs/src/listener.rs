//! Session observers
//!
//! View listeners hear about page content (navigation, titles, URLs).
//! Chrome listeners hear about everything around it (focus, progress,
//! fullscreen, permission prompts, file pickers).

use std::rc::Rc;

use crate::engine::{
    FileChooserParams, FilePathCallback, FullscreenCallback, GeolocationCallback, HitTarget,
};
use crate::tab::Tab;

pub trait TabsViewListener {
    fn on_tab_started(&self, _tab: &Rc<Tab>) {}

    fn on_tab_finished(&self, _tab: &Rc<Tab>, _is_secure: bool) {}

    fn on_url_changed(&self, _tab: &Rc<Tab>, _url: &str) {}

    fn on_received_title(&self, _tab: &Rc<Tab>, _title: &str) {}

    /// Returning `true` stops the remaining listeners from being asked.
    fn handle_external_url(&self, _tab: &Rc<Tab>, _url: &str) -> bool {
        false
    }

    fn update_failing_url(&self, _tab: &Rc<Tab>, _url: &str, _update_from_error: bool) {}
}

pub trait TabsChromeListener {
    /// A tab was brought to focus and has a live engine.
    fn on_tab_hoist(&self, _tab: &Rc<Tab>) {}

    fn on_tab_count_changed(&self, _count: usize) {}

    fn on_progress_changed(&self, _tab: &Rc<Tab>, _progress: i32) {}

    /// Returning `true` stops the remaining listeners from being asked.
    fn on_show_file_chooser(
        &self,
        _tab: &Rc<Tab>,
        _params: &FileChooserParams,
        _callback: &Rc<dyn FilePathCallback>,
    ) -> bool {
        false
    }

    fn on_long_press(&self, _tab: &Rc<Tab>, _hit_target: &HitTarget) {}

    fn on_enter_full_screen(&self, _tab: &Rc<Tab>, _callback: &Rc<dyn FullscreenCallback>) {}

    fn on_exit_full_screen(&self, _tab: &Rc<Tab>) {}

    fn on_geolocation_permissions_show_prompt(
        &self,
        _tab: &Rc<Tab>,
        _origin: &str,
        _callback: &Rc<dyn GeolocationCallback>,
    ) {
    }
}
