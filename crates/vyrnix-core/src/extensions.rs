//! Unpacked extensions loaded into the hosting layer

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::commands::CommandResult;
use crate::host::HostingLayer;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionRecord {
    pub id: String,
    pub name: String,
    pub version: String,
    pub path: String,
    pub enabled: bool,
}

/// Extensions known this process lifetime, enabled or not
#[derive(Debug, Default)]
pub struct ExtensionRegistry {
    records: Vec<ExtensionRecord>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&self) -> Vec<ExtensionRecord> {
        self.records.clone()
    }

    pub fn load(&mut self, host: &mut dyn HostingLayer, path: &Path) -> CommandResult<ExtensionRecord> {
        let loaded = match host.load_extension(path) {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to load extension");
                return CommandResult::err(e.to_string());
            }
        };

        let record = ExtensionRecord {
            id: loaded.id,
            name: loaded.name,
            version: loaded.version,
            path: loaded.path,
            enabled: true,
        };

        match self.records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record.clone(),
            None => self.records.push(record.clone()),
        }

        tracing::info!(extension_id = %record.id, name = %record.name, "Loaded extension");
        CommandResult::ok(record)
    }

    /// Reload a disabled extension from its recorded path
    pub fn enable(&mut self, host: &mut dyn HostingLayer, id: &str) -> CommandResult<()> {
        let Some(record) = self.records.iter_mut().find(|r| r.id == id && !r.enabled) else {
            return CommandResult::failed();
        };

        match host.load_extension(Path::new(&record.path)) {
            Ok(_) => {
                record.enabled = true;
                tracing::info!(extension_id = %id, "Enabled extension");
                CommandResult::ok(())
            }
            Err(e) => {
                tracing::warn!(extension_id = %id, error = %e, "Failed to enable extension");
                CommandResult::err(e.to_string())
            }
        }
    }

    /// Unload from the host but keep the record
    pub fn disable(&mut self, host: &mut dyn HostingLayer, id: &str) -> CommandResult<()> {
        let Some(record) = self.records.iter_mut().find(|r| r.id == id && r.enabled) else {
            return CommandResult::failed();
        };

        match host.remove_extension(id) {
            Ok(()) => {
                record.enabled = false;
                tracing::info!(extension_id = %id, "Disabled extension");
                CommandResult::ok(())
            }
            Err(e) => {
                tracing::warn!(extension_id = %id, error = %e, "Failed to disable extension");
                CommandResult::err(e.to_string())
            }
        }
    }

    /// Unload and forget. The host may already have dropped it.
    pub fn remove(&mut self, host: &mut dyn HostingLayer, id: &str) -> CommandResult<()> {
        let Some(index) = self.records.iter().position(|r| r.id == id) else {
            return CommandResult::failed();
        };

        if let Err(e) = host.remove_extension(id) {
            tracing::debug!(extension_id = %id, error = %e, "Extension already removed from host");
        }
        self.records.remove(index);

        tracing::info!(extension_id = %id, "Removed extension");
        CommandResult::ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeHost;

    #[test]
    fn test_extension_lifecycle() {
        let mut host = FakeHost::default();
        let mut registry = ExtensionRegistry::new();

        let loaded = registry.load(&mut host, Path::new("/ext/ublock"));
        assert!(loaded.success);
        let record = loaded.data.unwrap();
        assert_eq!(record.id, "ublock");
        assert!(record.enabled);

        // Already enabled
        assert_eq!(registry.enable(&mut host, "ublock"), CommandResult::failed());

        assert!(registry.disable(&mut host, "ublock").success);
        assert!(!registry.list()[0].enabled);
        assert!(host.state().extensions.is_empty());

        assert!(registry.enable(&mut host, "ublock").success);
        assert_eq!(host.state().extensions, vec!["ublock".to_string()]);

        assert!(registry.remove(&mut host, "ublock").success);
        assert!(registry.list().is_empty());
        assert_eq!(registry.remove(&mut host, "ublock"), CommandResult::failed());
    }

    #[test]
    fn test_host_failures_become_errors() {
        let mut host = FakeHost::default();
        let mut registry = ExtensionRegistry::new();

        host.state().fail_extensions = true;
        let result = registry.load(&mut host, Path::new("/ext/broken"));
        assert!(!result.success);
        assert!(result.error.unwrap().contains("manifest"));
        assert!(registry.list().is_empty());

        host.state().fail_extensions = false;
        registry.load(&mut host, Path::new("/ext/dark"));
        host.state().fail_extensions = true;

        let result = registry.disable(&mut host, "dark");
        assert!(result.error.is_some());
        assert!(registry.list()[0].enabled);

        // Removal ignores host failures
        assert!(registry.remove(&mut host, "dark").success);
    }
}
