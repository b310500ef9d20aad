//! User-facing browser settings

use serde::{Deserialize, Serialize};

use vyrnix_privacy::BlockListEngine;
use vyrnix_storage::Database;

use crate::Result;

/// Store key holding the settings JSON
pub const SETTINGS_KEY: &str = "settings";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BrowserSettings {
    pub theme: String,
    pub search_engine: String,
    pub ad_block_enabled: bool,
    pub https_only_mode: bool,
    pub show_bookmarks_bar: bool,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            theme: "light".to_string(),
            search_engine: "google".to_string(),
            ad_block_enabled: true,
            https_only_mode: true,
            show_bookmarks_bar: true,
        }
    }
}

impl BrowserSettings {
    /// Stored settings, or defaults when nothing has been saved yet
    pub fn load(db: &Database) -> Result<Self> {
        Ok(db.get_json::<Self>(SETTINGS_KEY)?.unwrap_or_default())
    }

    pub fn save(&self, db: &Database) -> Result<()> {
        db.set_json(SETTINGS_KEY, self)?;
        Ok(())
    }

    /// Push the privacy toggles into the live engine
    pub fn apply_to(&self, engine: &mut BlockListEngine) {
        engine.set_blocking_enabled(self.ad_block_enabled);
        engine.set_upgrade_enabled(self.https_only_mode);

        tracing::debug!(
            ad_block = self.ad_block_enabled,
            https_only = self.https_only_mode,
            "Applied privacy settings"
        );
    }
}
