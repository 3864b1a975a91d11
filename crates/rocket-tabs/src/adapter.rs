//! Per-tab event forwarding
//!
//! Each tab in a session gets one view adapter and one chrome adapter. They
//! turn raw engine callbacks into session events tagged with the tab, and
//! hand them to every registered listener in order.

use std::rc::{Rc, Weak};

use crate::client::{ChromeClient, ViewClient};
use crate::engine::{
    FileChooserParams, FilePathCallback, FullscreenCallback, GeolocationCallback, HitTarget,
    ViewHandle, WindowTransport,
};
use crate::session::{SessionInner, TabsSession};
use crate::snapshot::TabId;
use crate::tab::Tab;

/// Upgrade both ends, or give up quietly once either is gone or the tab
/// has been destroyed.
fn resolve(session: &Weak<SessionInner>, source: &Weak<Tab>) -> Option<(TabsSession, Rc<Tab>)> {
    let session = TabsSession::from_inner(session.upgrade()?);
    let source = source.upgrade().filter(|tab| !tab.is_destroyed())?;
    Some((session, source))
}

pub(crate) struct TabViewClientImpl {
    session: Weak<SessionInner>,
    source: Weak<Tab>,
}

impl TabViewClientImpl {
    pub fn new(session: Weak<SessionInner>, source: Weak<Tab>) -> Self {
        Self { session, source }
    }
}

impl ViewClient for TabViewClientImpl {
    fn on_page_started(&self, url: &str) {
        let Some((session, source)) = resolve(&self.session, &self.source) else {
            return;
        };

        source.set_url(url);
        source.refresh_title();

        for listener in session.view_listeners() {
            listener.on_tab_started(&source);
        }
    }

    fn on_page_finished(&self, is_secure: bool) {
        let Some((session, source)) = resolve(&self.session, &self.source) else {
            return;
        };

        source.refresh_title();

        for listener in session.view_listeners() {
            listener.on_tab_finished(&source, is_secure);
        }
    }

    fn on_url_changed(&self, url: &str) {
        let Some((session, source)) = resolve(&self.session, &self.source) else {
            return;
        };

        source.set_url(url);
        source.refresh_title();

        for listener in session.view_listeners() {
            listener.on_url_changed(&source, url);
        }
    }

    fn handle_external_url(&self, url: &str) -> bool {
        let Some((session, source)) = resolve(&self.session, &self.source) else {
            return false;
        };

        session
            .view_listeners()
            .iter()
            .any(|listener| listener.handle_external_url(&source, url))
    }

    fn update_failing_url(&self, url: &str, update_from_error: bool) {
        let Some((session, source)) = resolve(&self.session, &self.source) else {
            return;
        };

        for listener in session.view_listeners() {
            listener.update_failing_url(&source, url, update_from_error);
        }
    }
}

pub(crate) struct TabChromeClientImpl {
    session: Weak<SessionInner>,
    source: Weak<Tab>,
}

impl TabChromeClientImpl {
    pub fn new(session: Weak<SessionInner>, source: Weak<Tab>) -> Self {
        Self { session, source }
    }
}

impl ChromeClient for TabChromeClientImpl {
    fn on_create_window(
        &self,
        is_dialog: bool,
        is_user_gesture: bool,
        transport: Option<Box<dyn WindowTransport>>,
    ) -> bool {
        let Some(transport) = transport else {
            return false;
        };
        let Some((session, source)) = resolve(&self.session, &self.source) else {
            return false;
        };

        // The engine is waiting on the transport, so this tab skips the queue
        let tab = session.add_tab_internal("", false);
        let Some(view) = tab.create_view(session.host()) else {
            return false;
        };
        transport.attach(view);

        tracing::info!(
            opener = %source.id(),
            tab_id = %tab.id(),
            is_dialog,
            is_user_gesture,
            "Opened tab for new window"
        );

        session.notify_tab_hoist(&tab);
        true
    }

    fn on_close_window(&self, view: &ViewHandle) {
        let Some((session, source)) = resolve(&self.session, &self.source) else {
            return;
        };

        let owns_view = source.view().is_some_and(|own| Rc::ptr_eq(&own, view));
        if !owns_view {
            return;
        }

        let closing: Vec<TabId> = session
            .tabs()
            .iter()
            .filter(|tab| tab.view().is_some_and(|v| Rc::ptr_eq(&v, view)))
            .map(|tab| tab.id().clone())
            .collect();

        for id in closing {
            session.remove_tab(&id);
        }
    }

    fn on_progress_changed(&self, progress: i32) {
        let Some((session, source)) = resolve(&self.session, &self.source) else {
            return;
        };

        for listener in session.chrome_listeners() {
            listener.on_progress_changed(&source, progress);
        }
    }

    fn on_show_file_chooser(
        &self,
        params: &FileChooserParams,
        callback: Rc<dyn FilePathCallback>,
    ) -> bool {
        let Some((session, source)) = resolve(&self.session, &self.source) else {
            return false;
        };

        session
            .chrome_listeners()
            .iter()
            .any(|listener| listener.on_show_file_chooser(&source, params, &callback))
    }

    fn on_received_title(&self, title: &str) {
        let Some((session, source)) = resolve(&self.session, &self.source) else {
            return;
        };

        for listener in session.view_listeners() {
            listener.on_received_title(&source, title);
        }
    }

    fn on_long_press(&self, hit_target: &HitTarget) {
        let Some((session, source)) = resolve(&self.session, &self.source) else {
            return;
        };

        for listener in session.chrome_listeners() {
            listener.on_long_press(&source, hit_target);
        }
    }

    fn on_enter_full_screen(&self, callback: Rc<dyn FullscreenCallback>) {
        let Some((session, source)) = resolve(&self.session, &self.source) else {
            return;
        };

        for listener in session.chrome_listeners() {
            listener.on_enter_full_screen(&source, &callback);
        }
    }

    fn on_exit_full_screen(&self) {
        let Some((session, source)) = resolve(&self.session, &self.source) else {
            return;
        };

        for listener in session.chrome_listeners() {
            listener.on_exit_full_screen(&source);
        }
    }

    fn on_geolocation_permissions_show_prompt(
        &self,
        origin: &str,
        callback: Rc<dyn GeolocationCallback>,
    ) {
        let Some((session, source)) = resolve(&self.session, &self.source) else {
            return;
        };

        for listener in session.chrome_listeners() {
            listener.on_geolocation_permissions_show_prompt(&source, origin, &callback);
        }
    }
}
