//! Vyrnix Storage Layer
//!
//! Durable key-value store for browser settings, bookmarks and history.
//! Values are strings; [`Database::get_json`] and [`Database::set_json`]
//! layer serde on top.

mod database;
mod error;
mod migrations;

pub use database::Database;
pub use error::StorageError;
pub use migrations::SCHEMA_VERSION;

pub type Result<T> = std::result::Result<T, StorageError>;
