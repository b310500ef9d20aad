//! Live transfer capability supplied by the hosting layer

use serde::{Deserialize, Serialize};

use crate::download::DownloadState;

/// Hosting-layer identifier for one transfer, used to route its events.
pub type TransferId = u64;

/// How a transfer ended, as reported by the hosting layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferOutcome {
    Completed,
    Cancelled,
    Interrupted,
}

impl TransferOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferOutcome::Completed => "completed",
            TransferOutcome::Cancelled => "cancelled",
            TransferOutcome::Interrupted => "interrupted",
        }
    }
}

impl From<TransferOutcome> for DownloadState {
    fn from(outcome: TransferOutcome) -> Self {
        match outcome {
            TransferOutcome::Completed => DownloadState::Completed,
            TransferOutcome::Cancelled => DownloadState::Cancelled,
            TransferOutcome::Interrupted => DownloadState::Interrupted,
        }
    }
}

/// A transfer in flight inside the hosting layer.
///
/// The tracker only reads from it and forwards pause/resume/cancel requests.
/// Dropping the handle releases the tracker's reference; it does not stop the
/// transfer.
pub trait Transfer: Send {
    fn url(&self) -> String;

    fn filename(&self) -> String;

    /// Destination on disk, once the hosting layer has chosen one
    fn save_path(&self) -> Option<String>;

    fn received_bytes(&self) -> u64;

    /// Total size in bytes, 0 when unknown
    fn total_bytes(&self) -> u64;

    fn is_paused(&self) -> bool;

    fn pause(&mut self);

    fn resume(&mut self);

    fn cancel(&mut self);
}
