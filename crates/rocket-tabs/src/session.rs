//! Tabs session
//!
//! Owns the ordered tabs, the focused ("current") tab, the observer lists,
//! and the hoisting protocol. Engines are never created inside a caller's
//! stack: add/switch/remove post a hoist to the [`Notifier`], and the host
//! drives the queue with [`TabsSession::dispatch_pending`] or
//! [`TabsSession::run`].
//!
//! A session is bound to the thread that created it (`Rc`-based, `!Send`).

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::adapter::{TabChromeClientImpl, TabViewClientImpl};
use crate::engine::{DownloadCallback, HostContext};
use crate::error::SessionError;
use crate::listener::{TabsChromeListener, TabsViewListener};
use crate::notifier::{Message, Notifier, RequestToken};
use crate::snapshot::{TabId, TabSnapshot};
use crate::store::{QueryCompletion, SaveCompletion, StoreError, TabModelStore};
use crate::tab::Tab;
use crate::Result;

/// Called once restore finishes with the first restored tab, or the failure.
pub type RestoreListener = Box<dyn FnOnce(Result<Rc<Tab>>)>;

pub type SaveListener = Box<dyn FnOnce(Result<()>)>;

#[derive(Clone)]
pub struct TabsSession {
    inner: Rc<SessionInner>,
}

pub(crate) struct SessionInner {
    host: Rc<dyn HostContext>,
    store: Rc<dyn TabModelStore>,
    notifier: Notifier,
    tabs: RefCell<Vec<Rc<Tab>>>,
    /// `None` iff `tabs` is empty
    current: Cell<Option<usize>>,
    view_listeners: RefCell<Vec<Rc<dyn TabsViewListener>>>,
    chrome_listeners: RefCell<Vec<Rc<dyn TabsChromeListener>>>,
    download_callback: RefCell<Option<Rc<dyn DownloadCallback>>>,
    /// Restore listeners held until their completion is handled
    pending_restores: RefCell<HashMap<RequestToken, RestoreListener>>,
    pending_saves: RefCell<HashMap<RequestToken, SaveListener>>,
}

impl TabsSession {
    pub fn new(host: Rc<dyn HostContext>, store: Rc<dyn TabModelStore>) -> Self {
        Self {
            inner: Rc::new(SessionInner {
                host,
                store,
                notifier: Notifier::new(),
                tabs: RefCell::new(Vec::new()),
                current: Cell::new(None),
                view_listeners: RefCell::new(Vec::new()),
                chrome_listeners: RefCell::new(Vec::new()),
                download_callback: RefCell::new(None),
                pending_restores: RefCell::new(HashMap::new()),
                pending_saves: RefCell::new(HashMap::new()),
            }),
        }
    }

    pub(crate) fn from_inner(inner: Rc<SessionInner>) -> Self {
        Self { inner }
    }

    pub(crate) fn host(&self) -> &dyn HostContext {
        self.inner.host.as_ref()
    }

    pub fn tabs_count(&self) -> usize {
        self.inner.tabs.borrow().len()
    }

    pub fn has_tabs(&self) -> bool {
        !self.inner.tabs.borrow().is_empty()
    }

    /// Copy of the tab order. Reordering it does not affect the session.
    pub fn tabs(&self) -> Vec<Rc<Tab>> {
        self.inner.tabs.borrow().clone()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.inner.current.get()
    }

    pub fn current_tab(&self) -> Option<Rc<Tab>> {
        let index = self.inner.current.get()?;
        self.inner.tabs.borrow().get(index).cloned()
    }

    pub fn tab(&self, id: &TabId) -> Option<Rc<Tab>> {
        self.inner
            .tabs
            .borrow()
            .iter()
            .find(|tab| tab.id() == id)
            .cloned()
    }

    fn tab_index(&self, id: &TabId) -> Option<usize> {
        self.inner.tabs.borrow().iter().position(|tab| tab.id() == id)
    }

    /// Append a tab for `url`, optionally focusing it.
    ///
    /// The first tab of an empty session is always focused and hoisted, even
    /// with `hoist == false`.
    ///
    /// An empty `url` creates nothing and returns the current tab's id; on an
    /// empty session that is [`SessionError::NoCurrentTab`].
    pub fn add_tab(&self, url: &str, hoist: bool) -> Result<TabId> {
        if url.is_empty() {
            return self
                .current_tab()
                .map(|tab| tab.id().clone())
                .ok_or(SessionError::NoCurrentTab);
        }

        Ok(self.add_tab_internal(url, hoist).id().clone())
    }

    pub(crate) fn add_tab_internal(&self, url: &str, hoist: bool) -> Rc<Tab> {
        let tab = Rc::new(Tab::new());
        if !url.is_empty() {
            tab.set_url(url);
        }

        self.bind_callback(&tab);

        let focus = hoist || self.inner.current.get().is_none();
        let count = {
            let mut tabs = self.inner.tabs.borrow_mut();
            tabs.push(Rc::clone(&tab));

            if focus {
                self.inner.current.set(Some(tabs.len() - 1));
            }

            tabs.len()
        };

        tracing::info!(tab_id = %tab.id(), url = %url, hoist, "Added tab");

        if focus {
            self.schedule_hoist(&tab);
        }

        self.notify_tab_count_changed(count);

        tab
    }

    /// Remove and destroy a tab. Unknown ids are ignored.
    pub fn remove_tab(&self, id: &TabId) {
        let Some(index) = self.tab_index(id) else {
            tracing::debug!(tab_id = %id, "Ignoring removal of unknown tab");
            return;
        };

        let (removed, next_focus, count) = {
            let mut tabs = self.inner.tabs.borrow_mut();
            let removed = tabs.remove(index);

            let current = match self.inner.current.get() {
                Some(current) if current == index => {
                    if tabs.is_empty() {
                        None
                    } else {
                        Some(index.min(tabs.len() - 1))
                    }
                }
                Some(current) if current > index => Some(current - 1),
                other => other,
            };
            self.inner.current.set(current);

            // Whatever tab is current afterwards gets hoisted again
            let next_focus = current.map(|i| Rc::clone(&tabs[i]));

            (removed, next_focus, tabs.len())
        };

        // Engine teardown may call back into the session, so no borrows here
        removed.destroy();

        tracing::info!(tab_id = %id, remaining = count, "Removed tab");

        if let Some(tab) = next_focus {
            self.schedule_hoist(&tab);
        }

        self.notify_tab_count_changed(count);
    }

    /// Focus a tab. Unknown ids are ignored.
    pub fn switch_to_tab(&self, id: &TabId) {
        let Some(index) = self.tab_index(id) else {
            tracing::debug!(tab_id = %id, "Ignoring switch to unknown tab");
            return;
        };

        self.inner.current.set(Some(index));

        let tab = Rc::clone(&self.inner.tabs.borrow()[index]);
        self.schedule_hoist(&tab);
    }

    /// Load saved tabs and append them. If they end up being the only tabs,
    /// the first becomes current.
    ///
    /// `listener` runs once from the dispatcher: with the first restored tab,
    /// or with the failure. It is not called when nothing was saved.
    pub fn restore_tabs<F>(&self, listener: F)
    where
        F: FnOnce(Result<Rc<Tab>>) + 'static,
    {
        let token = self.inner.notifier.next_token();
        self.inner
            .pending_restores
            .borrow_mut()
            .insert(token, Box::new(listener));

        tracing::debug!(token = ?token, "Requesting saved tabs");

        let completion = QueryCompletion::new(token, self.inner.notifier.sender());
        self.inner.store.get_saved_tabs(completion);
    }

    /// Persist every tab as it is right now. Fire-and-forget; failures are logged.
    pub fn save_tabs(&self) {
        self.save_internal(None);
    }

    /// Like [`TabsSession::save_tabs`], reporting the outcome to `listener`.
    pub fn save_tabs_with<F>(&self, listener: F)
    where
        F: FnOnce(Result<()>) + 'static,
    {
        self.save_internal(Some(Box::new(listener)));
    }

    fn save_internal(&self, listener: Option<SaveListener>) {
        let snapshots: Vec<TabSnapshot> = self
            .tabs()
            .iter()
            .map(|tab| tab.save_model())
            .collect();

        let token = self.inner.notifier.next_token();
        if let Some(listener) = listener {
            self.inner.pending_saves.borrow_mut().insert(token, listener);
        }

        tracing::debug!(token = ?token, count = snapshots.len(), "Saving tabs");

        let completion = SaveCompletion::new(token, self.inner.notifier.sender());
        self.inner.store.save_tabs(snapshots, completion);
    }

    /// Install the download sink on every current and future tab.
    pub fn set_download_callback(&self, callback: Option<Rc<dyn DownloadCallback>>) {
        *self.inner.download_callback.borrow_mut() = callback.clone();

        for tab in self.tabs() {
            tab.set_download_callback(callback.clone());
        }
    }

    pub fn add_tabs_view_listener(&self, listener: Rc<dyn TabsViewListener>) {
        let mut listeners = self.inner.view_listeners.borrow_mut();
        if !listeners.iter().any(|l| Rc::ptr_eq(l, &listener)) {
            listeners.push(listener);
        }
    }

    pub fn remove_tabs_view_listener(&self, listener: &Rc<dyn TabsViewListener>) {
        self.inner
            .view_listeners
            .borrow_mut()
            .retain(|l| !Rc::ptr_eq(l, listener));
    }

    pub fn add_tabs_chrome_listener(&self, listener: Rc<dyn TabsChromeListener>) {
        let mut listeners = self.inner.chrome_listeners.borrow_mut();
        if !listeners.iter().any(|l| Rc::ptr_eq(l, &listener)) {
            listeners.push(listener);
        }
    }

    pub fn remove_tabs_chrome_listener(&self, listener: &Rc<dyn TabsChromeListener>) {
        self.inner
            .chrome_listeners
            .borrow_mut()
            .retain(|l| !Rc::ptr_eq(l, listener));
    }

    pub fn pause(&self) {
        for tab in self.tabs() {
            tab.pause();
        }
    }

    pub fn resume(&self) {
        for tab in self.tabs() {
            tab.resume();
        }
    }

    /// Destroy every tab. Only call once the host has removed the views.
    pub fn destroy(&self) {
        let tabs = std::mem::take(&mut *self.inner.tabs.borrow_mut());
        self.inner.current.set(None);

        for tab in &tabs {
            tab.destroy();
        }

        tracing::info!(count = tabs.len(), "Destroyed session");
    }

    /// Handle everything queued so far, plus anything those handlers queue.
    /// Returns the number of messages handled.
    pub fn dispatch_pending(&self) -> usize {
        let mut handled = 0;
        while let Some(message) = self.inner.notifier.try_next() {
            self.handle_message(message);
            handled += 1;
        }
        handled
    }

    /// Drive the dispatcher forever. Run it on the session's thread, e.g.
    /// with `tokio::task::spawn_local`.
    pub async fn run(&self) {
        let Some(mut receiver) = self.inner.notifier.take_receiver() else {
            tracing::warn!("Dispatcher is already being driven");
            return;
        };

        while let Some(message) = receiver.recv().await {
            self.handle_message(message);
        }
    }

    fn handle_message(&self, message: Message) {
        match message {
            Message::HoistTab(id) => self.hoist_tab(&id),
            Message::SaveComplete { token, result } => self.on_save_complete(token, result),
            Message::QueryComplete { token, result } => self.on_query_complete(token, result),
        }
    }

    fn schedule_hoist(&self, tab: &Tab) {
        tracing::debug!(tab_id = %tab.id(), "Scheduling hoist");
        self.inner
            .notifier
            .post(Message::HoistTab(tab.id().clone()));
    }

    fn hoist_tab(&self, id: &TabId) {
        // The tab may have been removed after the hoist was queued
        let Some(tab) = self.tab(id).filter(|tab| !tab.is_destroyed()) else {
            tracing::debug!(tab_id = %id, "Dropping stale hoist");
            return;
        };

        if !tab.has_view() {
            let url = tab.url();
            if let Some(view) = tab.create_view(self.host()) {
                if !url.is_empty() {
                    view.load_url(&url);
                }
            }
        }

        self.notify_tab_hoist(&tab);
    }

    fn on_query_complete(
        &self,
        token: RequestToken,
        result: std::result::Result<Vec<TabSnapshot>, StoreError>,
    ) {
        let listener = self.inner.pending_restores.borrow_mut().remove(&token);

        let snapshots = match result {
            Ok(snapshots) => snapshots,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to restore tabs");
                if let Some(listener) = listener {
                    listener(Err(e.into()));
                }
                return;
            }
        };

        let mut restored: Vec<Rc<Tab>> = Vec::with_capacity(snapshots.len());
        for snapshot in snapshots {
            let duplicate = self.tab_index(&snapshot.id).is_some()
                || restored.iter().any(|tab| *tab.id() == snapshot.id);
            if duplicate {
                tracing::warn!(tab_id = %snapshot.id, "Skipping saved tab that is already open");
                continue;
            }

            let tab = Rc::new(Tab::from_snapshot(snapshot));
            self.bind_callback(&tab);
            restored.push(tab);
        }

        {
            let mut tabs = self.inner.tabs.borrow_mut();
            tabs.extend(restored.iter().cloned());

            if !tabs.is_empty() && tabs.len() == restored.len() {
                self.inner.current.set(Some(0));
            }
        }

        tracing::info!(count = restored.len(), "Restored tabs");

        if let (Some(listener), Some(first)) = (listener, restored.first()) {
            listener(Ok(Rc::clone(first)));
        }
    }

    fn on_save_complete(&self, token: RequestToken, result: std::result::Result<(), StoreError>) {
        let listener = self.inner.pending_saves.borrow_mut().remove(&token);

        match (listener, result) {
            (Some(listener), result) => listener(result.map_err(SessionError::from)),
            (None, Err(e)) => tracing::warn!(error = %e, "Failed to save tabs"),
            (None, Ok(())) => {}
        }
    }

    fn bind_callback(&self, tab: &Rc<Tab>) {
        let session = Rc::downgrade(&self.inner);
        let source = Rc::downgrade(tab);

        tab.set_view_client(Some(Rc::new(TabViewClientImpl::new(
            session.clone(),
            source.clone(),
        ))));
        tab.set_chrome_client(Some(Rc::new(TabChromeClientImpl::new(session, source))));
        tab.set_download_callback(self.inner.download_callback.borrow().clone());
    }

    /// Snapshot of the view listeners, safe to iterate while they (un)register.
    pub(crate) fn view_listeners(&self) -> Vec<Rc<dyn TabsViewListener>> {
        self.inner.view_listeners.borrow().clone()
    }

    pub(crate) fn chrome_listeners(&self) -> Vec<Rc<dyn TabsChromeListener>> {
        self.inner.chrome_listeners.borrow().clone()
    }

    pub(crate) fn notify_tab_hoist(&self, tab: &Rc<Tab>) {
        for listener in self.chrome_listeners() {
            listener.on_tab_hoist(tab);
        }
    }

    fn notify_tab_count_changed(&self, count: usize) {
        for listener in self.chrome_listeners() {
            listener.on_tab_count_changed(count);
        }
    }
}
