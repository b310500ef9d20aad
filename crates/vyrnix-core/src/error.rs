//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] vyrnix_storage::StorageError),

    #[error("Tab error: {0}")]
    Tab(#[from] vyrnix_tabs::TabError),

    #[error("Download error: {0}")]
    Download(#[from] vyrnix_download::DownloadError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Session dispatcher is not running")]
    DispatcherClosed,
}

/// Failure of an external action performed by the hosting layer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("Failed to open {path}: {reason}")]
    OpenFailed { path: String, reason: String },

    #[error("Failed to open {url} externally: {reason}")]
    OpenExternalFailed { url: String, reason: String },

    #[error("Extension error: {0}")]
    Extension(String),
}
