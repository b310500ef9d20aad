//! The hosting layer as seen by the control plane

use serde::{Deserialize, Serialize};
use std::path::Path;

use vyrnix_tabs::ViewHost;

use crate::error::HostError;

/// What the hosting layer reports after loading an unpacked extension
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadedExtension {
    pub id: String,
    pub name: String,
    pub version: String,
    pub path: String,
}

/// View creation plus the external actions that can fail and whose
/// failure is reported back to the caller.
pub trait HostingLayer: ViewHost + 'static {
    /// Hand a file to the operating system
    fn open_path(&mut self, path: &Path) -> Result<(), HostError>;

    /// Open a URL in the system's default browser
    fn open_external(&mut self, url: &str) -> Result<(), HostError>;

    fn load_extension(&mut self, path: &Path) -> Result<LoadedExtension, HostError>;

    fn remove_extension(&mut self, id: &str) -> Result<(), HostError>;
}
