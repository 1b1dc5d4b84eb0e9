//! Persisted local configuration: the backend endpoint URL.
//!
//! This is the only locally persisted state. A missing or unreadable file
//! yields the default (unconfigured) config; the caller is expected to
//! surface first-run guidance instead of auto-syncing.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from reading or writing the config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Filesystem failure.
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization failure.
    #[error("config encoding error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Locally persisted settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backend web-app endpoint URL; `None` until first configured.
    #[serde(default)]
    pub endpoint_url: Option<String>,
}

fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("hookstock")
}

/// Default location of the config file.
pub fn default_path() -> PathBuf {
    config_dir().join("config.json")
}

impl Config {
    /// True once an endpoint URL has been saved.
    pub fn is_configured(&self) -> bool {
        self.endpoint_url.as_deref().is_some_and(|u| !u.trim().is_empty())
    }

    /// Loads from the default path.
    pub fn load() -> Self {
        Self::load_from(&default_path())
    }

    /// Loads from an explicit path; missing or corrupt files fall back to
    /// the default config.
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    /// Saves to the default path, creating the config dir if needed.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&default_path())
    }

    /// Saves to an explicit path, creating parent directories if needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, format!("{json}\n"))?;
        Ok(())
    }
}
