//! Vyrnix View Registry
//!
//! Owns every tab and the content surface behind it.
//! Tabs are either placeholders (home screen, no surface) or live surfaces
//! whose loads are tagged with a per-tab sequence number so that late
//! completions from superseded loads are discarded.

mod error;
mod host;
mod registry;
mod state;
mod tab;

pub use error::{TabError, ViewError};
pub use host::{ContentHandle, ViewBounds, ViewHost};
pub use registry::{TabOverview, ViewRegistry, BLANK_URL, DEFAULT_CHROME_OFFSET};
pub use state::TabPhase;
pub use tab::{Tab, TabCreated, TabSnapshot, TabSurface, LOADING_TITLE, NEW_TAB_TITLE};

pub type Result<T> = std::result::Result<T, TabError>;
