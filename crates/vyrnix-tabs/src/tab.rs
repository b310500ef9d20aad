//! Tab data structure
//!
//! A tab carries display metadata for the tab strip and, unless it is a
//! placeholder, the content surface it owns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TabError;
use crate::host::ContentHandle;
use crate::state::TabPhase;
use crate::Result;

pub const NEW_TAB_TITLE: &str = "New Tab";
pub const LOADING_TITLE: &str = "Loading...";

/// What backs a tab
pub enum TabSurface {
    /// Home screen, nothing to display
    Placeholder,
    /// A content surface and the sequence number of its most recent load
    Live {
        handle: Box<dyn ContentHandle>,
        load_seq: u64,
    },
}

impl std::fmt::Debug for TabSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TabSurface::Placeholder => f.write_str("Placeholder"),
            TabSurface::Live { handle, load_seq } => f
                .debug_struct("Live")
                .field("view_id", &handle.view_id())
                .field("load_seq", load_seq)
                .finish(),
        }
    }
}

#[derive(Debug)]
pub struct Tab {
    /// Unique identifier
    pub id: String,
    /// Last requested or committed address, None for a placeholder
    pub url: Option<String>,
    pub title: String,
    pub favicon: Option<String>,
    phase: TabPhase,
    surface: TabSurface,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Serializable view of a tab for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabSnapshot {
    pub id: String,
    pub url: Option<String>,
    pub title: String,
    pub favicon: Option<String>,
    pub is_loading: bool,
}

/// Result of creating a tab
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabCreated {
    pub id: String,
    pub url: Option<String>,
    pub title: String,
}

impl Tab {
    pub fn placeholder() -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4().to_string(),
            url: None,
            title: NEW_TAB_TITLE.to_string(),
            favicon: None,
            phase: TabPhase::Placeholder,
            surface: TabSurface::Placeholder,
            created_at: now,
            updated_at: now,
        }
    }

    /// A tab whose first load (sequence 1) is about to be issued.
    pub fn live(url: String, handle: Box<dyn ContentHandle>) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4().to_string(),
            url: Some(url),
            title: LOADING_TITLE.to_string(),
            favicon: None,
            phase: TabPhase::Loading,
            surface: TabSurface::Live {
                handle,
                load_seq: 1,
            },
            created_at: now,
            updated_at: now,
        }
    }

    pub fn phase(&self) -> TabPhase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase.is_loading()
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self.surface, TabSurface::Placeholder)
    }

    pub fn load_seq(&self) -> Option<u64> {
        match &self.surface {
            TabSurface::Live { load_seq, .. } => Some(*load_seq),
            TabSurface::Placeholder => None,
        }
    }

    /// True if `seq` tags the most recent load of this tab
    pub fn is_current(&self, seq: u64) -> bool {
        self.load_seq() == Some(seq)
    }

    pub fn handle(&self) -> Option<&dyn ContentHandle> {
        match &self.surface {
            TabSurface::Live { handle, .. } => Some(&**handle),
            TabSurface::Placeholder => None,
        }
    }

    pub fn handle_mut(&mut self) -> Result<&mut Box<dyn ContentHandle>> {
        match &mut self.surface {
            TabSurface::Live { handle, .. } => Ok(handle),
            TabSurface::Placeholder => Err(TabError::NoContentHandle(self.id.clone())),
        }
    }

    /// Attempt to transition to a new phase
    pub fn transition_to(&mut self, target: TabPhase) -> Result<()> {
        if !self.phase.can_transition_to(target) {
            return Err(TabError::InvalidTransition {
                from: self.phase.to_string(),
                to: target.to_string(),
            });
        }

        tracing::debug!(
            tab_id = %self.id,
            from = %self.phase,
            to = %target,
            "Tab phase transition"
        );

        self.phase = target;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Begin a new load and return its sequence number.
    pub fn start_load(&mut self, url: Option<String>) -> Result<u64> {
        let TabSurface::Live { load_seq, .. } = &mut self.surface else {
            return Err(TabError::NoContentHandle(self.id.clone()));
        };

        if !self.phase.can_transition_to(TabPhase::Loading) {
            return Err(TabError::InvalidTransition {
                from: self.phase.to_string(),
                to: TabPhase::Loading.to_string(),
            });
        }

        *load_seq += 1;
        let seq = *load_seq;

        self.phase = TabPhase::Loading;
        if let Some(url) = url {
            self.url = Some(url);
        }
        self.updated_at = Utc::now();

        tracing::debug!(tab_id = %self.id, seq, "Load started");
        Ok(seq)
    }

    /// Apply a load-finished event. Returns false for a stale sequence.
    pub fn finish_load(&mut self, seq: u64) -> bool {
        if !self.is_current(seq) {
            return false;
        }

        let Some(handle) = self.handle() else {
            return false;
        };
        let title = handle.title();
        let committed = handle.url();

        if let Some(url) = committed {
            self.url = Some(url);
        }
        self.title = title;
        if self.title.is_empty() {
            self.title = self.display_title().to_string();
        }

        self.transition_to(TabPhase::Ready).is_ok()
    }

    /// Apply a favicon event. Returns false for a stale sequence.
    pub fn apply_favicon(&mut self, seq: u64, favicon: Option<String>) -> bool {
        if !self.is_current(seq) {
            return false;
        }

        self.favicon = favicon;
        self.updated_at = Utc::now();
        true
    }

    /// Move to `Closed` and hand back the surface for destruction.
    pub fn close(&mut self) -> Option<Box<dyn ContentHandle>> {
        if let Err(e) = self.transition_to(TabPhase::Closed) {
            tracing::debug!(tab_id = %self.id, error = %e, "Tab already closed");
        }

        match std::mem::replace(&mut self.surface, TabSurface::Placeholder) {
            TabSurface::Live { handle, .. } => Some(handle),
            TabSurface::Placeholder => None,
        }
    }

    /// Title with fallback to URL
    pub fn display_title(&self) -> &str {
        if !self.title.is_empty() {
            &self.title
        } else {
            self.url.as_deref().unwrap_or(NEW_TAB_TITLE)
        }
    }

    pub fn snapshot(&self) -> TabSnapshot {
        TabSnapshot {
            id: self.id.clone(),
            url: self.url.clone(),
            title: self.title.clone(),
            favicon: self.favicon.clone(),
            is_loading: self.is_loading(),
        }
    }
}
