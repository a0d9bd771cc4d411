//! Tasktree Configuration Module
//!
//! Selects which built-in step loaders make up the registry, and in what
//! order they are tried. Stored in `~/.config/tasktree/config.toml`:
//!
//! ```toml
//! [loaders]
//! enabled = ["script", "task", "sequence"]
//! ```
//!
//! ## Priority Order (highest to lowest)
//!
//! 1. Environment variable (`TASKTREE_LOADERS`, comma separated)
//! 2. Config file (`--config <path>` or the default location)
//! 3. Defaults (every built-in loader)

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, TaskTreeError};
use crate::step::BuiltinLoader;

/// Environment variable overriding `[loaders] enabled`
pub const LOADERS_ENV: &str = "TASKTREE_LOADERS";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TaskTreeConfig {
    #[serde(default)]
    pub loaders: LoadersConfig,
}

/// Loader selection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoadersConfig {
    /// Built-in loaders to register, in trial order
    #[serde(default = "default_enabled")]
    pub enabled: Vec<BuiltinLoader>,
}

impl Default for LoadersConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
        }
    }
}

fn default_enabled() -> Vec<BuiltinLoader> {
    BuiltinLoader::ALL.to_vec()
}

impl TaskTreeConfig {
    /// Returns `~/.config/tasktree/` on Unix, `%APPDATA%/tasktree/` on Windows
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tasktree")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from the default location
    ///
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load configuration from an explicit path; the file must exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(TaskTreeError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let content = fs::read_to_string(path).map_err(|e| TaskTreeError::Config {
            reason: format!("Failed to read config file: {}", e),
        })?;
        debug!(path = %path.display(), "loaded config file");
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| TaskTreeError::Config {
            reason: format!("Failed to parse config file: {}", e),
        })
    }

    /// Merge with environment variables
    ///
    /// Environment variables take precedence over config file values.
    pub fn with_env(mut self) -> Result<Self> {
        if let Ok(list) = std::env::var(LOADERS_ENV) {
            if !list.trim().is_empty() {
                self.apply_loader_list(&list)?;
            }
        }
        Ok(self)
    }

    /// Replace the enabled loaders with a comma separated list
    pub fn apply_loader_list(&mut self, list: &str) -> Result<()> {
        self.loaders.enabled = list
            .split(',')
            .filter(|name| !name.trim().is_empty())
            .map(str::parse)
            .collect::<Result<Vec<BuiltinLoader>>>()?;
        Ok(())
    }
}
