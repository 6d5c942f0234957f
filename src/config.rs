//! Configuration management for depot
//!
//! Settings come from three places, strongest first: CLI flags, the
//! project manifest's `root` key, and the global config file at
//! `~/.config/depot/config.toml`.

use crate::error::{DepotError, DepotResult};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Default manifest file name in the project root
pub const MANIFEST_FILE: &str = "depot.toml";

/// Default download root, relative to the project root
pub const DEFAULT_ROOT: &str = "external";

/// Global configuration file contents
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Download root override
    pub root: Option<PathBuf>,
    /// Manifest file name override
    pub manifest: Option<PathBuf>,
}

/// Loads the global config and resolves effective paths
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("depot")
            .join("config.toml")
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load the global config; a missing file yields defaults
    pub async fn load(&self) -> DepotResult<Config> {
        if !self.config_path.exists() {
            debug!(path = %self.config_path.display(), "no global config");
            return Ok(Config::default());
        }
        let raw = fs::read_to_string(&self.config_path)
            .await
            .map_err(|e| DepotError::io(format!("reading {}", self.config_path.display()), e))?;
        toml::from_str(&raw).map_err(|e| DepotError::ConfigInvalid {
            path: self.config_path.clone(),
            reason: e.to_string(),
        })
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
