//! Application configuration file.
//!
//! A JSON document holding default limits and options:
//!
//! ```json
//! {
//!   "limits": { "maxFiles": 20, "maxFileSize": 20971520 },
//!   "options": { "format": "avif", "quality": 60 }
//! }
//! ```
//!
//! Every field is optional; missing ones take their defaults.

use crate::core::optimizer::OptimizeOptions;
use crate::core::validation::Limits;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Defaults loaded at startup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    pub limits: Limits,
    pub options: OptimizeOptions,
}

impl AppConfig {
    /// Location of the per-user config file, if the platform has one
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("image-squeeze").join("config.json"))
    }

    /// Load an explicit file, or the per-user file if it exists,
    /// or fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.is_file() => Self::from_file(&path),
                _ => {
                    tracing::debug!("no config file, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    /// Read and parse a config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Self = serde_json::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config
            .options
            .validate()
            .map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }
}
