//! Vyrnix Download Tracker
//!
//! Tracks every transfer the hosting layer reports:
//! - One `Download` record per observed transfer
//! - Progress is last-write-wins, terminal states are final
//! - Records stay visible until an explicit bulk clear

mod download;
mod error;
mod tracker;
mod transfer;

pub use download::{new_download_id, Download, DownloadState};
pub use error::DownloadError;
pub use tracker::DownloadTracker;
pub use transfer::{Transfer, TransferId, TransferOutcome};

pub type Result<T> = std::result::Result<T, DownloadError>;
