//! Tab snapshot rows

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::Database;
use crate::Result;

/// A persisted tab, as stored in the `tabs` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabRecord {
    /// Tab identifier, preserved across restarts
    pub id: String,
    pub title: String,
    pub url: String,
    /// Opaque engine state blob
    pub web_view_state: Option<Vec<u8>>,
    /// When this row was written
    pub saved_at: DateTime<Utc>,
}

impl TabRecord {
    pub fn new(id: String, title: String, url: String, web_view_state: Option<Vec<u8>>) -> Self {
        Self {
            id,
            title,
            url,
            web_view_state,
            saved_at: Utc::now(),
        }
    }
}

impl Database {
    /// Replace the whole tab set with `records`, keeping their order.
    pub fn replace_tabs(&self, records: &[TabRecord]) -> Result<usize> {
        let written = self.transaction(|conn| {
            conn.execute("DELETE FROM tabs", [])?;

            let mut stmt = conn.prepare(
                "INSERT INTO tabs (position, id, title, url, web_view_state, saved_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;

            for (position, record) in records.iter().enumerate() {
                stmt.execute(rusqlite::params![
                    position as i64,
                    record.id,
                    record.title,
                    record.url,
                    record.web_view_state,
                    record.saved_at.to_rfc3339(),
                ])?;
            }

            Ok(records.len())
        })?;

        tracing::debug!(count = written, "Replaced saved tabs");

        Ok(written)
    }

    /// Load every saved tab in tab-bar order.
    pub fn load_tabs(&self) -> Result<Vec<TabRecord>> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, url, web_view_state, saved_at
                 FROM tabs ORDER BY position ASC",
            )?;

            let records = stmt
                .query_map([], |row| {
                    let saved_str: String = row.get(4)?;
                    let saved_at = DateTime::parse_from_rfc3339(&saved_str)
                        .map(|dt| dt.with_timezone(&Utc))
                        .unwrap_or_else(|_| Utc::now());

                    Ok(TabRecord {
                        id: row.get(0)?,
                        title: row.get(1)?,
                        url: row.get(2)?,
                        web_view_state: row.get(3)?,
                        saved_at,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(records)
        })
    }
}
