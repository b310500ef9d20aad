//! Vyrnix Core
//!
//! The session control plane: owns every tab, download, and block counter,
//! and is the only component that talks to the hosting layer. All commands
//! and host events are serialized through one dispatcher task; the
//! presentation layer only ever sees serializable snapshots.

mod commands;
mod config;
mod control_plane;
mod dispatcher;
mod error;
mod events;
mod extensions;
mod host;
mod library;
mod notification;
mod settings;

#[cfg(test)]
mod testing;

pub use commands::{Command, CommandResult};
pub use config::Config;
pub use control_plane::ControlPlane;
pub use dispatcher::{Dispatcher, SessionHandle};
pub use error::{CoreError, HostError};
pub use events::{event_channel, EventSink, EventStream, HostEvent, RequestVerdict};
pub use extensions::{ExtensionRecord, ExtensionRegistry};
pub use host::{HostingLayer, LoadedExtension};
pub use library::{Bookmark, HistoryEntry, Library, NewBookmark, NewHistoryEntry};
pub use notification::{notification_channel, Notification, NotificationSender};
pub use settings::BrowserSettings;

// Re-export core components
pub use vyrnix_download::{Download, DownloadError, DownloadState, Transfer, TransferId, TransferOutcome};
pub use vyrnix_privacy::{BlockDecision, BlockListEngine, BlockStats};
pub use vyrnix_storage::{Database, StorageError};
pub use vyrnix_tabs::{
    ContentHandle, TabCreated, TabError, TabOverview, TabSnapshot, ViewBounds, ViewError, ViewHost,
};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging. Later calls are no-ops.
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = fmt().with_env_filter(filter).with_target(true).try_init();
}
