//! Test doubles for engines, hosts, stores and listeners.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::client::{ChromeClient, ViewClient};
use crate::engine::{
    Download, DownloadCallback, FileChooserParams, FilePathCallback, FullscreenCallback,
    GeolocationCallback, HitTarget, HostContext, ViewEngine, ViewHandle, WindowTransport,
};
use crate::listener::{TabsChromeListener, TabsViewListener};
use crate::snapshot::{TabId, TabSnapshot};
use crate::store::{QueryCompletion, SaveCompletion, StoreError, TabModelStore};
use crate::tab::Tab;

pub fn snapshot(id: &str) -> TabSnapshot {
    TabSnapshot {
        id: TabId::from(id),
        title: format!("Title {id}"),
        url: format!("https://{id}.example"),
        web_view_state: None,
    }
}

#[derive(Default)]
pub struct FakeEngine {
    url: RefCell<String>,
    title: RefCell<String>,
    loaded: RefCell<Vec<String>>,
    restored: RefCell<Option<Vec<u8>>>,
    view_client: RefCell<Option<Rc<dyn ViewClient>>>,
    chrome_client: RefCell<Option<Rc<dyn ChromeClient>>>,
    download_callback: RefCell<Option<Rc<dyn DownloadCallback>>>,
    blocking: Cell<Option<bool>>,
    paused: Cell<bool>,
    attached: Cell<bool>,
    detach_calls: Cell<usize>,
    cleanup_calls: Cell<usize>,
    destroy_calls: Cell<usize>,
}

impl FakeEngine {
    pub fn set_title(&self, title: &str) {
        *self.title.borrow_mut() = title.to_string();
    }

    pub fn loaded_urls(&self) -> Vec<String> {
        self.loaded.borrow().clone()
    }

    pub fn restored_state(&self) -> Option<Vec<u8>> {
        self.restored.borrow().clone()
    }

    pub fn view_client(&self) -> Rc<dyn ViewClient> {
        self.view_client.borrow().clone().expect("no view client")
    }

    pub fn chrome_client(&self) -> Rc<dyn ChromeClient> {
        self.chrome_client.borrow().clone().expect("no chrome client")
    }

    pub fn has_clients(&self) -> bool {
        self.view_client.borrow().is_some() || self.chrome_client.borrow().is_some()
    }

    pub fn has_download_callback(&self) -> bool {
        self.download_callback.borrow().is_some()
    }

    pub fn start_download(&self, download: &Download) {
        let callback = self.download_callback.borrow().clone();
        if let Some(callback) = callback {
            callback.on_download_start(download);
        }
    }

    pub fn blocking(&self) -> Option<bool> {
        self.blocking.get()
    }

    pub fn is_paused(&self) -> bool {
        self.paused.get()
    }

    pub fn is_attached_now(&self) -> bool {
        self.attached.get()
    }

    pub fn detach_calls(&self) -> usize {
        self.detach_calls.get()
    }

    pub fn cleanup_calls(&self) -> usize {
        self.cleanup_calls.get()
    }

    pub fn destroy_calls(&self) -> usize {
        self.destroy_calls.get()
    }
}

impl ViewEngine for FakeEngine {
    fn load_url(&self, url: &str) {
        *self.url.borrow_mut() = url.to_string();
        self.loaded.borrow_mut().push(url.to_string());
    }

    fn title(&self) -> String {
        self.title.borrow().clone()
    }

    fn url(&self) -> String {
        self.url.borrow().clone()
    }

    fn save_view_state(&self) -> Vec<u8> {
        self.url.borrow().as_bytes().to_vec()
    }

    fn restore_view_state(&self, state: &[u8]) {
        *self.restored.borrow_mut() = Some(state.to_vec());
    }

    fn set_view_client(&self, client: Option<Rc<dyn ViewClient>>) {
        *self.view_client.borrow_mut() = client;
    }

    fn set_chrome_client(&self, client: Option<Rc<dyn ChromeClient>>) {
        *self.chrome_client.borrow_mut() = client;
    }

    fn set_download_callback(&self, callback: Option<Rc<dyn DownloadCallback>>) {
        *self.download_callback.borrow_mut() = callback;
    }

    fn set_blocking_enabled(&self, enabled: bool) {
        self.blocking.set(Some(enabled));
    }

    fn on_pause(&self) {
        self.paused.set(true);
    }

    fn on_resume(&self) {
        self.paused.set(false);
    }

    fn is_attached(&self) -> bool {
        self.attached.get()
    }

    fn detach(&self) {
        self.detach_calls.set(self.detach_calls.get() + 1);
        self.attached.set(false);
    }

    fn cleanup(&self) {
        self.cleanup_calls.set(self.cleanup_calls.get() + 1);
    }

    fn destroy(&self) {
        self.destroy_calls.set(self.destroy_calls.get() + 1);
    }
}

/// Host that records every engine it hands out.
pub struct FakeHost {
    engines: RefCell<Vec<Rc<FakeEngine>>>,
    attach_new: bool,
}

impl FakeHost {
    pub fn new() -> Self {
        Self {
            engines: RefCell::new(Vec::new()),
            attach_new: false,
        }
    }

    /// Engines start out inside a parent container.
    pub fn attached() -> Self {
        Self {
            attach_new: true,
            ..Self::new()
        }
    }

    pub fn created_count(&self) -> usize {
        self.engines.borrow().len()
    }

    pub fn engine(&self, index: usize) -> Rc<FakeEngine> {
        Rc::clone(&self.engines.borrow()[index])
    }
}

impl HostContext for FakeHost {
    fn create_view_engine(&self) -> ViewHandle {
        let engine = Rc::new(FakeEngine::default());
        engine.attached.set(self.attach_new);
        self.engines.borrow_mut().push(Rc::clone(&engine));
        engine
    }
}

#[derive(Clone)]
pub struct FakeTransport {
    slot: Rc<RefCell<Option<ViewHandle>>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self {
            slot: Rc::new(RefCell::new(None)),
        }
    }

    pub fn attached(&self) -> Option<ViewHandle> {
        self.slot.borrow().clone()
    }
}

impl WindowTransport for FakeTransport {
    fn attach(self: Box<Self>, view: ViewHandle) {
        *self.slot.borrow_mut() = Some(view);
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum QueryMode {
    Answer,
    Hold,
    Drop,
}

/// In-memory store that answers inline unless told otherwise.
pub struct MemoryStore {
    saved: RefCell<Vec<TabSnapshot>>,
    failure: RefCell<Option<String>>,
    mode: Cell<QueryMode>,
    held: RefCell<Vec<QueryCompletion>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            saved: RefCell::new(Vec::new()),
            failure: RefCell::new(None),
            mode: Cell::new(QueryMode::Answer),
            held: RefCell::new(Vec::new()),
        }
    }

    pub fn seed(&self, snapshots: Vec<TabSnapshot>) {
        *self.saved.borrow_mut() = snapshots;
    }

    pub fn saved(&self) -> Vec<TabSnapshot> {
        self.saved.borrow().clone()
    }

    pub fn fail_with(&self, reason: &str) {
        *self.failure.borrow_mut() = Some(reason.to_string());
    }

    pub fn hold_queries(&self) {
        self.mode.set(QueryMode::Hold);
    }

    pub fn drop_queries(&self) {
        self.mode.set(QueryMode::Drop);
    }

    pub fn release_queries(&self) {
        self.mode.set(QueryMode::Answer);
        let held: Vec<QueryCompletion> = self.held.borrow_mut().drain(..).collect();
        for completion in held {
            completion.complete(Ok(self.saved()));
        }
    }

    fn failure(&self) -> Option<StoreError> {
        self.failure
            .borrow()
            .clone()
            .map(StoreError::Unavailable)
    }
}

impl TabModelStore for MemoryStore {
    fn save_tabs(&self, snapshots: Vec<TabSnapshot>, completion: SaveCompletion) {
        match self.failure() {
            Some(e) => completion.complete(Err(e)),
            None => {
                *self.saved.borrow_mut() = snapshots;
                completion.complete(Ok(()));
            }
        }
    }

    fn get_saved_tabs(&self, completion: QueryCompletion) {
        if let Some(e) = self.failure() {
            completion.complete(Err(e));
            return;
        }

        match self.mode.get() {
            QueryMode::Answer => completion.complete(Ok(self.saved())),
            QueryMode::Hold => self.held.borrow_mut().push(completion),
            QueryMode::Drop => drop(completion),
        }
    }
}

/// Records every event it hears as a short string.
pub struct RecordingListener {
    events: RefCell<Vec<String>>,
    handles: bool,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self {
            events: RefCell::new(Vec::new()),
            handles: false,
        }
    }

    /// Claims every external URL and file chooser it is offered.
    pub fn handling() -> Self {
        Self {
            handles: true,
            ..Self::new()
        }
    }

    pub fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    fn record(&self, event: String) {
        self.events.borrow_mut().push(event);
    }
}

impl TabsViewListener for RecordingListener {
    fn on_tab_started(&self, tab: &Rc<Tab>) {
        self.record(format!("started:{}", tab.id()));
    }

    fn on_tab_finished(&self, tab: &Rc<Tab>, is_secure: bool) {
        self.record(format!("finished:{}:{is_secure}", tab.id()));
    }

    fn on_url_changed(&self, tab: &Rc<Tab>, url: &str) {
        self.record(format!("url:{}:{url}", tab.id()));
    }

    fn on_received_title(&self, tab: &Rc<Tab>, title: &str) {
        self.record(format!("title:{}:{title}", tab.id()));
    }

    fn handle_external_url(&self, _tab: &Rc<Tab>, url: &str) -> bool {
        self.record(format!("external:{url}"));
        self.handles
    }

    fn update_failing_url(&self, tab: &Rc<Tab>, url: &str, update_from_error: bool) {
        self.record(format!("failing:{}:{url}:{update_from_error}", tab.id()));
    }
}

impl TabsChromeListener for RecordingListener {
    fn on_tab_hoist(&self, tab: &Rc<Tab>) {
        self.record(format!("hoist:{}", tab.id()));
    }

    fn on_tab_count_changed(&self, count: usize) {
        self.record(format!("count:{count}"));
    }

    fn on_progress_changed(&self, tab: &Rc<Tab>, progress: i32) {
        self.record(format!("progress:{}:{progress}", tab.id()));
    }

    fn on_show_file_chooser(
        &self,
        tab: &Rc<Tab>,
        _params: &FileChooserParams,
        _callback: &Rc<dyn FilePathCallback>,
    ) -> bool {
        self.record(format!("file-chooser:{}", tab.id()));
        self.handles
    }

    fn on_long_press(&self, tab: &Rc<Tab>, hit_target: &HitTarget) {
        let kind = if hit_target.is_link() {
            "link"
        } else if hit_target.is_image() {
            "image"
        } else {
            "none"
        };
        self.record(format!("long-press:{}:{kind}", tab.id()));
    }

    fn on_enter_full_screen(&self, tab: &Rc<Tab>, callback: &Rc<dyn FullscreenCallback>) {
        self.record(format!("enter-fullscreen:{}", tab.id()));
        callback.full_screen_exited();
    }

    fn on_exit_full_screen(&self, tab: &Rc<Tab>) {
        self.record(format!("exit-fullscreen:{}", tab.id()));
    }

    fn on_geolocation_permissions_show_prompt(
        &self,
        tab: &Rc<Tab>,
        origin: &str,
        callback: &Rc<dyn GeolocationCallback>,
    ) {
        self.record(format!("geolocation:{}:{origin}", tab.id()));
        callback.invoke(origin, false, false);
    }
}

impl DownloadCallback for RecordingListener {
    fn on_download_start(&self, download: &Download) {
        self.record(format!("download:{}", download.url));
    }
}
