//! Bookmarks and history
//!
//! Both are stored as JSON lists in the key-value store. History is kept
//! newest first and capped.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use vyrnix_storage::Database;

use crate::Result;

const BOOKMARKS_KEY: &str = "bookmarks";
const HISTORY_KEY: &str = "history";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    /// Millisecond timestamp at creation, unique within the list
    pub id: i64,
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBookmark {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub folder: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub url: String,
    pub title: String,
    /// Milliseconds since the epoch
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewHistoryEntry {
    pub url: String,
    #[serde(default)]
    pub title: String,
}

fn normalize_folder(folder: Option<String>) -> Option<String> {
    folder
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub struct Library {
    db: Database,
    history_limit: usize,
}

impl Library {
    pub fn new(db: Database, history_limit: usize) -> Self {
        Self { db, history_limit }
    }

    pub fn bookmarks(&self) -> Result<Vec<Bookmark>> {
        Ok(self.db.get_json::<Vec<Bookmark>>(BOOKMARKS_KEY)?.unwrap_or_default())
    }

    /// Append a bookmark and return the full list
    pub fn add_bookmark(&self, bookmark: NewBookmark) -> Result<Vec<Bookmark>> {
        let mut bookmarks = self.bookmarks()?;

        let mut id = Utc::now().timestamp_millis();
        if let Some(max) = bookmarks.iter().map(|b| b.id).max() {
            id = id.max(max + 1);
        }

        bookmarks.push(Bookmark {
            id,
            title: bookmark.title,
            url: bookmark.url,
            folder: normalize_folder(bookmark.folder),
        });
        self.db.set_json(BOOKMARKS_KEY, &bookmarks)?;

        tracing::info!(bookmark_id = id, "Added bookmark");
        Ok(bookmarks)
    }

    /// Remove by id and return what remains
    pub fn remove_bookmark(&self, id: i64) -> Result<Vec<Bookmark>> {
        let mut bookmarks = self.bookmarks()?;
        bookmarks.retain(|b| b.id != id);
        self.db.set_json(BOOKMARKS_KEY, &bookmarks)?;
        Ok(bookmarks)
    }

    pub fn history(&self) -> Result<Vec<HistoryEntry>> {
        Ok(self.db.get_json::<Vec<HistoryEntry>>(HISTORY_KEY)?.unwrap_or_default())
    }

    /// Record a visit at the front of the list
    pub fn add_history(&self, entry: NewHistoryEntry) -> Result<Vec<HistoryEntry>> {
        let mut history = self.history()?;
        history.insert(
            0,
            HistoryEntry {
                url: entry.url,
                title: entry.title,
                timestamp: Utc::now().timestamp_millis(),
            },
        );
        history.truncate(self.history_limit);

        self.db.set_json(HISTORY_KEY, &history)?;
        Ok(history)
    }

    pub fn clear_history(&self) -> Result<Vec<HistoryEntry>> {
        self.db.set_json(HISTORY_KEY, &Vec::<HistoryEntry>::new())?;
        tracing::info!("Cleared history");
        Ok(Vec::new())
    }
}
