//! Notifications pushed to the presentation layer

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use vyrnix_download::Download;
use vyrnix_privacy::BlockStats;
use vyrnix_tabs::TabSnapshot;

/// Serialized as `{"event": "<name>", "payload": ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "kebab-case")]
pub enum Notification {
    TabUpdated(TabSnapshot),
    /// The presentation layer should open a placeholder tab
    NewTab,
    BlockStats(BlockStats),
    DownloadsUpdate(Vec<Download>),
}

impl Notification {
    pub fn name(&self) -> &'static str {
        match self {
            Notification::TabUpdated(_) => "tab-updated",
            Notification::NewTab => "new-tab",
            Notification::BlockStats(_) => "block-stats",
            Notification::DownloadsUpdate(_) => "downloads-update",
        }
    }
}

pub type NotificationSender = mpsc::UnboundedSender<Notification>;

pub fn notification_channel() -> (NotificationSender, mpsc::UnboundedReceiver<Notification>) {
    mpsc::unbounded_channel()
}
