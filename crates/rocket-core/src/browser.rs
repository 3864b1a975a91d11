//! Browser assembly
//!
//! Owns the configuration, the database and the tabs session, and applies
//! browser-wide settings to tabs as they are hoisted.

use std::cell::Cell;
use std::rc::Rc;

use tokio::runtime::Handle;

use rocket_storage::Database;
use rocket_tabs::{
    DatabaseTabStore, HostContext, Tab, TabId, TabModelStore, TabsChromeListener, TabsSession,
};

use crate::config::Config;
use crate::Result;

/// Applies the content-blocking setting to every tab that comes to the front.
struct ContentBlocking {
    enabled: Cell<bool>,
}

impl TabsChromeListener for ContentBlocking {
    fn on_tab_hoist(&self, tab: &Rc<Tab>) {
        tab.set_blocking_enabled(self.enabled.get());
    }
}

/// Main browser instance
///
/// Bound to the thread that created it, like the session it owns.
pub struct Browser {
    config: Config,
    db: Database,
    session: TabsSession,
    blocking: Rc<ContentBlocking>,
}

impl Browser {
    /// Open the configured database and build a session on top of it.
    pub fn new(config: Config, host: Rc<dyn HostContext>) -> Result<Self> {
        // Ensure data directory exists
        if let Some(parent) = config.database_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::open(&config.database_path)?;

        Ok(Self::with_database(config, db, host))
    }

    /// Build on an already open database.
    ///
    /// Store work runs on the blocking pool of the current tokio runtime when
    /// there is one, otherwise inline.
    pub fn with_database(config: Config, db: Database, host: Rc<dyn HostContext>) -> Self {
        let store: Rc<dyn TabModelStore> = match Handle::try_current() {
            Ok(runtime) => Rc::new(DatabaseTabStore::with_runtime(db.clone(), runtime)),
            Err(_) => Rc::new(DatabaseTabStore::new(db.clone())),
        };

        let session = TabsSession::new(host, store);

        let blocking = Rc::new(ContentBlocking {
            enabled: Cell::new(config.content_blocking),
        });
        session.add_tabs_chrome_listener(blocking.clone());

        tracing::info!(
            database = %config.database_path.display(),
            content_blocking = config.content_blocking,
            "Browser initialized"
        );

        Self {
            config,
            db,
            session,
            blocking,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn session(&self) -> &TabsSession {
        &self.session
    }

    /// Change content blocking for every live tab and every future hoist.
    pub fn set_content_blocking(&mut self, enabled: bool) {
        self.config.content_blocking = enabled;
        self.blocking.enabled.set(enabled);

        for tab in self.session.tabs() {
            tab.set_blocking_enabled(enabled);
        }
    }

    /// Ask for the saved tabs when `restore_on_start` is set. Returns whether
    /// a restore was requested.
    ///
    /// `on_restored` runs from the dispatcher with the first restored tab or
    /// the failure; if the restored tab became current it is hoisted first.
    /// Nothing is called when there was nothing to restore, so hosts follow
    /// up with [`Browser::open_homepage_if_empty`] once the queue is drained.
    pub fn start<F>(&self, on_restored: F) -> bool
    where
        F: FnOnce(rocket_tabs::Result<Rc<Tab>>) + 'static,
    {
        if !self.config.restore_on_start {
            tracing::debug!("Tab restore disabled");
            return false;
        }

        let session = self.session.clone();
        self.session.restore_tabs(move |result| {
            if let Ok(first) = &result {
                let is_current = session
                    .current_tab()
                    .is_some_and(|current| Rc::ptr_eq(&current, first));
                if is_current {
                    session.switch_to_tab(first.id());
                }
            }

            on_restored(result);
        });

        true
    }

    /// Open the homepage in a focused tab when no tab is open.
    pub fn open_homepage_if_empty(&self) -> Result<Option<TabId>> {
        if self.session.has_tabs() {
            return Ok(None);
        }

        let id = self.session.add_tab(&self.config.homepage, true)?;
        tracing::info!(tab_id = %id, homepage = %self.config.homepage, "Opened homepage");

        Ok(Some(id))
    }

    /// Save every tab, then tear the session down.
    pub fn shutdown(&self) {
        self.session.save_tabs();
        self.session.destroy();

        // Delivers whatever completions are already queued
        self.session.dispatch_pending();

        tracing::info!("Browser shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::path::PathBuf;

    use rocket_storage::TabRecord;
    use rocket_tabs::{ChromeClient, DownloadCallback, ViewClient, ViewEngine, ViewHandle};

    #[derive(Default)]
    struct StubEngine {
        url: RefCell<String>,
        blocking: Cell<Option<bool>>,
        destroyed: Cell<bool>,
    }

    impl ViewEngine for StubEngine {
        fn load_url(&self, url: &str) {
            *self.url.borrow_mut() = url.to_string();
        }

        fn title(&self) -> String {
            String::new()
        }

        fn url(&self) -> String {
            self.url.borrow().clone()
        }

        fn save_view_state(&self) -> Vec<u8> {
            Vec::new()
        }

        fn restore_view_state(&self, _state: &[u8]) {}

        fn set_view_client(&self, _client: Option<Rc<dyn ViewClient>>) {}

        fn set_chrome_client(&self, _client: Option<Rc<dyn ChromeClient>>) {}

        fn set_download_callback(&self, _callback: Option<Rc<dyn DownloadCallback>>) {}

        fn set_blocking_enabled(&self, enabled: bool) {
            self.blocking.set(Some(enabled));
        }

        fn on_pause(&self) {}

        fn on_resume(&self) {}

        fn is_attached(&self) -> bool {
            false
        }

        fn detach(&self) {}

        fn cleanup(&self) {}

        fn destroy(&self) {
            self.destroyed.set(true);
        }
    }

    #[derive(Default)]
    struct StubHost {
        engines: RefCell<Vec<Rc<StubEngine>>>,
    }

    impl StubHost {
        fn engine(&self, index: usize) -> Rc<StubEngine> {
            Rc::clone(&self.engines.borrow()[index])
        }

        fn created_count(&self) -> usize {
            self.engines.borrow().len()
        }
    }

    impl HostContext for StubHost {
        fn create_view_engine(&self) -> ViewHandle {
            let engine = Rc::new(StubEngine::default());
            self.engines.borrow_mut().push(Rc::clone(&engine));
            engine
        }
    }

    fn browser(config: Config) -> (Browser, Rc<StubHost>) {
        let host = Rc::new(StubHost::default());
        let db = Database::open_in_memory().unwrap();
        (Browser::with_database(config, db, host.clone()), host)
    }

    fn config() -> Config {
        Config::new(PathBuf::from("/unused"))
    }

    #[test]
    fn test_new_creates_data_directory() {
        let dir = std::env::temp_dir().join(format!("rocket-core-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);

        let config = Config::new(dir.join("profile"));
        let host = Rc::new(StubHost::default());
        let browser = Browser::new(config, host).unwrap();

        assert!(dir.join("profile").join("tabs.db").exists());
        assert!(!browser.session().has_tabs());

        drop(browser);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_homepage_opens_only_when_empty() {
        let mut config = config();
        config.homepage = "https://start.example".to_string();
        let (browser, host) = browser(config);

        let id = browser.open_homepage_if_empty().unwrap().unwrap();
        assert!(browser.open_homepage_if_empty().unwrap().is_none());
        browser.session().dispatch_pending();

        assert_eq!(browser.session().tabs_count(), 1);
        assert_eq!(browser.session().current_tab().unwrap().id(), &id);
        assert_eq!(*host.engine(0).url.borrow(), "https://start.example");
    }

    #[test]
    fn test_hoisted_tabs_follow_content_blocking() {
        let (mut browser, host) = browser(config());
        browser.open_homepage_if_empty().unwrap();
        browser.session().dispatch_pending();
        assert_eq!(host.engine(0).blocking.get(), Some(true));

        browser.set_content_blocking(false);
        assert_eq!(host.engine(0).blocking.get(), Some(false));
        assert!(!browser.config().content_blocking);

        browser.session().add_tab("https://b.example", true).unwrap();
        browser.session().dispatch_pending();
        assert_eq!(host.engine(1).blocking.get(), Some(false));
    }

    #[test]
    fn test_start_restores_and_hoists_first_tab() {
        let (browser, host) = browser(config());
        browser
            .database()
            .replace_tabs(&[
                TabRecord::new("a".into(), "A".into(), "https://a.example".into(), None),
                TabRecord::new("b".into(), "B".into(), "https://b.example".into(), None),
            ])
            .unwrap();

        let restored = Rc::new(RefCell::new(None));
        let slot = restored.clone();
        assert!(browser.start(move |result| {
            *slot.borrow_mut() = Some(result.unwrap().id().to_string());
        }));
        browser.session().dispatch_pending();

        assert_eq!(restored.borrow().as_deref(), Some("a"));
        assert_eq!(browser.session().tabs_count(), 2);
        assert_eq!(host.created_count(), 1);
        assert_eq!(*host.engine(0).url.borrow(), "https://a.example");
        assert!(browser.open_homepage_if_empty().unwrap().is_none());
    }

    #[test]
    fn test_start_with_nothing_saved_falls_back_to_homepage() {
        let (browser, _) = browser(config());

        let called = Rc::new(Cell::new(false));
        let flag = called.clone();
        browser.start(move |_| flag.set(true));
        browser.session().dispatch_pending();

        assert!(!called.get());
        assert!(browser.open_homepage_if_empty().unwrap().is_some());
    }

    #[test]
    fn test_start_without_restore_does_nothing() {
        let mut config = config();
        config.restore_on_start = false;
        let (browser, _) = browser(config);
        browser
            .database()
            .replace_tabs(&[TabRecord::new(
                "a".into(),
                "A".into(),
                "https://a.example".into(),
                None,
            )])
            .unwrap();

        assert!(!browser.start(|_| {}));
        assert_eq!(browser.session().dispatch_pending(), 0);
        assert!(!browser.session().has_tabs());
    }

    #[test]
    fn test_shutdown_saves_then_destroys() {
        let (browser, host) = browser(config());
        browser.session().add_tab("https://a.example", true).unwrap();
        browser.session().add_tab("https://b.example", false).unwrap();
        browser.session().dispatch_pending();

        browser.shutdown();

        assert!(!browser.session().has_tabs());
        assert!(host.engine(0).destroyed.get());

        let saved = browser.database().load_tabs().unwrap();
        let urls: Vec<&str> = saved.iter().map(|record| record.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a.example", "https://b.example"]);
    }
}
