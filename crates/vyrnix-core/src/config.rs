//! Browser configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use vyrnix_tabs::{BLANK_URL, DEFAULT_CHROME_OFFSET};

use crate::error::CoreError;
use crate::Result;

pub const DATA_DIR_ENV: &str = "VYRNIX_DATA_DIR";
pub const DEV_HOST_ENV: &str = "VYRNIX_DEV_HOST";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Path to the settings/library database
    pub database_path: PathBuf,
    /// Height reserved at the top of the window for browser chrome
    pub chrome_offset: u32,
    /// Address loaded in place of blank or malformed URLs
    pub blank_url: String,
    /// Host exempt from the https upgrade
    pub dev_host: String,
    /// Maximum stored history entries
    pub history_limit: usize,
}

impl Config {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            database_path: data_dir.join("vyrnix.db"),
            chrome_offset: DEFAULT_CHROME_OFFSET,
            blank_url: BLANK_URL.to_string(),
            dev_host: "localhost".to_string(),
            history_limit: 1000,
        }
    }

    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|d| d.join("Vyrnix"))
            .unwrap_or_else(|| PathBuf::from(".vyrnix"))
    }

    /// Defaults overlaid with `VYRNIX_DATA_DIR` and `VYRNIX_DEV_HOST`.
    pub fn from_env() -> Result<Self> {
        let data_dir = std::env::var_os(DATA_DIR_ENV).map(PathBuf::from);
        let dev_host = std::env::var(DEV_HOST_ENV).ok();
        Self::from_overrides(data_dir, dev_host)
    }

    fn from_overrides(data_dir: Option<PathBuf>, dev_host: Option<String>) -> Result<Self> {
        let mut config = match data_dir {
            Some(dir) if dir.as_os_str().is_empty() => {
                return Err(CoreError::Config(format!("{DATA_DIR_ENV} is empty")));
            }
            Some(dir) => Self::new(dir),
            None => Self::default(),
        };

        if let Some(host) = dev_host {
            let host = host.trim().to_lowercase();
            if host.is_empty() {
                return Err(CoreError::Config(format!("{DEV_HOST_ENV} is empty")));
            }
            config.dev_host = host;
        }

        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::data_dir())
    }
}
