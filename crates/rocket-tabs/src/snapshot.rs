//! Persisted tab state

use rocket_storage::TabRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable identifier for a tab. Survives save and restore.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(String);

impl TabId {
    /// Generate a fresh, never-reused identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for TabId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<&str> for TabId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything needed to bring a tab back after the process dies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabSnapshot {
    pub id: TabId,
    pub title: String,
    pub url: String,
    /// Opaque engine state, `None` until the tab has had an engine
    pub web_view_state: Option<Vec<u8>>,
}

impl TabSnapshot {
    pub fn new(id: TabId) -> Self {
        Self {
            id,
            title: String::new(),
            url: String::new(),
            web_view_state: None,
        }
    }
}

impl From<TabRecord> for TabSnapshot {
    fn from(record: TabRecord) -> Self {
        Self {
            id: TabId::from(record.id),
            title: record.title,
            url: record.url,
            web_view_state: record.web_view_state,
        }
    }
}

impl From<TabSnapshot> for TabRecord {
    fn from(snapshot: TabSnapshot) -> Self {
        TabRecord::new(
            snapshot.id.0,
            snapshot.title,
            snapshot.url,
            snapshot.web_view_state,
        )
    }
}
