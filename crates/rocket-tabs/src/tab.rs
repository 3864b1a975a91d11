//! A single browsing unit
//!
//! A tab is either *persisted-only* (just a [`TabSnapshot`]) or
//! *engine-backed* (it also owns a live [`ViewHandle`]). The engine is only
//! created on demand, and is torn down exactly once by [`Tab::destroy`].

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::client::{ChromeClient, ViewClient};
use crate::engine::{DownloadCallback, HostContext, ViewHandle};
use crate::snapshot::{TabId, TabSnapshot};

pub struct Tab {
    id: TabId,
    /// Last known persisted state
    model: RefCell<TabSnapshot>,
    /// Live engine, present once the tab has been hoisted
    view: RefCell<Option<ViewHandle>>,
    view_client: RefCell<Option<Rc<dyn ViewClient>>>,
    chrome_client: RefCell<Option<Rc<dyn ChromeClient>>>,
    download_callback: RefCell<Option<Rc<dyn DownloadCallback>>>,
    destroyed: Cell<bool>,
}

impl Tab {
    /// A blank tab with a fresh id.
    pub fn new() -> Self {
        Self::from_snapshot(TabSnapshot::new(TabId::generate()))
    }

    /// Rebuild a tab from saved state, keeping its id.
    pub fn from_snapshot(snapshot: TabSnapshot) -> Self {
        Self {
            id: snapshot.id.clone(),
            model: RefCell::new(snapshot),
            view: RefCell::new(None),
            view_client: RefCell::new(None),
            chrome_client: RefCell::new(None),
            download_callback: RefCell::new(None),
            destroyed: Cell::new(false),
        }
    }

    pub fn id(&self) -> &TabId {
        &self.id
    }

    pub fn title(&self) -> String {
        match self.view() {
            Some(view) => view.title(),
            None => self.model.borrow().title.clone(),
        }
    }

    pub fn url(&self) -> String {
        match self.view() {
            Some(view) => view.url(),
            None => self.model.borrow().url.clone(),
        }
    }

    pub fn view(&self) -> Option<ViewHandle> {
        self.view.borrow().clone()
    }

    pub fn has_view(&self) -> bool {
        self.view.borrow().is_some()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.get()
    }

    /// Current persisted state. An engine-backed tab first pulls title, URL
    /// and engine state from the live view.
    pub fn save_model(&self) -> TabSnapshot {
        if let Some(view) = self.view() {
            let title = view.title();
            let url = view.url();
            let state = view.save_view_state();

            let mut model = self.model.borrow_mut();
            model.title = title;
            model.url = url;
            model.web_view_state = Some(state);
        }

        self.model.borrow().clone()
    }

    /// Materialize the engine for this tab, or return the existing one.
    ///
    /// Returns `None` only once the tab has been destroyed.
    pub fn create_view(&self, host: &dyn HostContext) -> Option<ViewHandle> {
        if self.is_destroyed() {
            return None;
        }

        if let Some(view) = self.view() {
            return Some(view);
        }

        let view = host.create_view_engine();
        view.set_view_client(self.view_client.borrow().clone());
        view.set_chrome_client(self.chrome_client.borrow().clone());
        view.set_download_callback(self.download_callback.borrow().clone());

        // Stored before restoring: the engine may call back into the clients
        *self.view.borrow_mut() = Some(Rc::clone(&view));

        let state = self.model.borrow().web_view_state.clone();
        if let Some(state) = state {
            view.restore_view_state(&state);
        }

        tracing::debug!(tab_id = %self.id, "Created view for tab");

        Some(view)
    }

    /// Tear down the engine (if any) and unbind every callback. The tab must
    /// not be used afterwards; repeated calls do nothing.
    pub fn destroy(&self) {
        if self.destroyed.replace(true) {
            return;
        }

        self.set_download_callback(None);
        self.set_view_client(None);
        self.set_chrome_client(None);

        let view = self.view.borrow_mut().take();
        if let Some(view) = view {
            view.cleanup();

            if view.is_attached() {
                view.detach();
            }

            view.destroy();
        }

        tracing::debug!(tab_id = %self.id, "Destroyed tab");
    }

    /// Take the view out of its parent container, if it is in one.
    pub fn detach(&self) {
        if let Some(view) = self.view() {
            if view.is_attached() {
                view.detach();
            }
        }
    }

    pub fn pause(&self) {
        if let Some(view) = self.view() {
            view.on_pause();
        }
    }

    pub fn resume(&self) {
        if let Some(view) = self.view() {
            view.on_resume();
        }
    }

    pub fn set_blocking_enabled(&self, enabled: bool) {
        if let Some(view) = self.view() {
            view.set_blocking_enabled(enabled);
        }
    }

    pub(crate) fn set_title(&self, title: &str) {
        self.model.borrow_mut().title = title.to_string();
    }

    pub(crate) fn set_url(&self, url: &str) {
        self.model.borrow_mut().url = url.to_string();
    }

    /// Copy the live view's title into the snapshot.
    pub(crate) fn refresh_title(&self) {
        if let Some(view) = self.view() {
            let title = view.title();
            self.set_title(&title);
        }
    }

    pub(crate) fn set_view_client(&self, client: Option<Rc<dyn ViewClient>>) {
        *self.view_client.borrow_mut() = client.clone();
        if let Some(view) = self.view() {
            view.set_view_client(client);
        }
    }

    pub(crate) fn set_chrome_client(&self, client: Option<Rc<dyn ChromeClient>>) {
        *self.chrome_client.borrow_mut() = client.clone();
        if let Some(view) = self.view() {
            view.set_chrome_client(client);
        }
    }

    pub(crate) fn set_download_callback(&self, callback: Option<Rc<dyn DownloadCallback>>) {
        *self.download_callback.borrow_mut() = callback.clone();
        if let Some(view) = self.view() {
            view.set_download_callback(callback);
        }
    }
}

impl Default for Tab {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tab")
            .field("id", &self.id)
            .field("url", &self.model.borrow().url)
            .field("has_view", &self.has_view())
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}
