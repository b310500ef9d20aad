//! Download error types

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DownloadError {
    #[error("Download not found: {0}")]
    NotFound(String),

    #[error("No live transfer for download: {0}")]
    NoLiveTransfer(String),

    #[error("Download is not in progress: {0}")]
    NotProgressing(String),

    #[error("Download has no save path: {0}")]
    NoSavePath(String),
}
