//! Application Configuration
//!
//! Settings shared by the CLI and the queue views, read from a YAML file.
//!
//! # Config File Resolution
//!
//! 1. `REMITDESK_CONFIG` environment variable
//! 2. `remitdesk.yaml` in the current directory
//!
//! A missing file is not an error; defaults apply.
//!
//! ```yaml
//! page_size: 25
//! placeholder_prefix: "Agent-"
//! placeholder_length: 8
//! verbose: false
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::source::DEFAULT_PAGE_SIZE;
use crate::table::directory::{DEFAULT_PLACEHOLDER_LENGTH, DEFAULT_PLACEHOLDER_PREFIX};
use crate::table::AgentDirectory;

/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "REMITDESK_CONFIG";

/// Lazily-resolved default config path.
pub static CONFIG_PATH: Lazy<PathBuf> = Lazy::new(|| {
    if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
        let path = PathBuf::from(path);
        info!("Using config from {}: {}", CONFIG_ENV_VAR, path.display());
        return path;
    }

    PathBuf::from("remitdesk.yaml")
});

/// Application settings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Rows per queue page
    pub page_size: usize,

    /// Prefix for agents missing from the directory
    pub placeholder_prefix: String,

    /// Agent id characters kept in a placeholder
    pub placeholder_length: usize,

    /// Debug logging
    pub verbose: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            placeholder_prefix: DEFAULT_PLACEHOLDER_PREFIX.to_string(),
            placeholder_length: DEFAULT_PLACEHOLDER_LENGTH,
            verbose: false,
        }
    }
}

impl AppConfig {
    /// Parses and validates config YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a config file. Returns defaults if the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let config = Self::from_yaml(&content)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Loads from [`CONFIG_PATH`].
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load(&CONFIG_PATH)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::Invalid {
                key: "page_size",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.placeholder_length == 0 {
            return Err(ConfigError::Invalid {
                key: "placeholder_length",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Applies the placeholder settings to a directory.
    pub fn configure_directory(&self, directory: AgentDirectory) -> AgentDirectory {
        directory.with_placeholder(&self.placeholder_prefix, self.placeholder_length)
    }
}
