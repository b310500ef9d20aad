//! Tab lifecycle
//!
//! ```text
//! Placeholder ──────────────┐
//!                           ↓ close
//! Loading ⇄ Ready ───────→ Closed
//! ```
//!
//! `Loading` is re-entered on every navigation, `Closed` is terminal.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabPhase {
    /// Home screen tab with no content surface
    Placeholder,
    /// A load has been issued and has not finished
    Loading,
    /// The most recent load finished
    Ready,
    /// Removed from the registry, surface released
    Closed,
}

impl TabPhase {
    /// Check if transition to another phase is valid
    pub fn can_transition_to(&self, target: TabPhase) -> bool {
        match (self, target) {
            (TabPhase::Closed, _) => false,
            (_, TabPhase::Closed) => true,
            // Placeholders never load; a surface replaces them only by a new tab
            (TabPhase::Placeholder, _) => false,
            (TabPhase::Loading | TabPhase::Ready, TabPhase::Loading | TabPhase::Ready) => true,
            _ => false,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, TabPhase::Loading)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TabPhase::Placeholder => "placeholder",
            TabPhase::Loading => "loading",
            TabPhase::Ready => "ready",
            TabPhase::Closed => "closed",
        }
    }
}

impl std::fmt::Display for TabPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TabPhase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "placeholder" => Ok(TabPhase::Placeholder),
            "loading" => Ok(TabPhase::Loading),
            "ready" => Ok(TabPhase::Ready),
            "closed" => Ok(TabPhase::Closed),
            _ => Err(format!("Unknown tab phase: {}", s)),
        }
    }
}
