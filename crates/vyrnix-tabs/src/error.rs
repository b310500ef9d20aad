//! Tab error types

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TabError {
    #[error("Tab not found: {0}")]
    NotFound(String),

    #[error("Tab has no content surface: {0}")]
    NoContentHandle(String),

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("View error: {0}")]
    View(#[from] ViewError),
}

/// Failures reported by the hosting layer for a content surface
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    #[error("Failed to create view: {0}")]
    CreateFailed(String),

    #[error("Failed to load {url}: {reason}")]
    LoadRejected { url: String, reason: String },

    #[error("View already destroyed")]
    Destroyed,
}
