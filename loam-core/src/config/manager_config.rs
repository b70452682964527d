//! Field manager configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Configuration for the field manager: directory layout, enabled plugins,
/// and the database location.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ManagerConfig {
    /// Core field-type manifest directory. Default: "fields".
    pub fields_dir: Option<PathBuf>,
    /// Root directory holding plugins. Default: "plugins". Each plugin
    /// keeps its own manifests under `{plugin}/fields/`.
    pub plugins_dir: Option<PathBuf>,
    /// Plugins whose field types participate in discovery.
    #[serde(default)]
    pub enabled_plugins: Vec<String>,
    /// SQLite database path. Default: "loam.db".
    pub database: Option<PathBuf>,
}

impl ManagerConfig {
    /// Load a configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                ConfigError::ReadError {
                    path: path.display().to_string(),
                    message: e.to_string(),
                }
            }
        })?;
        toml::from_str(&raw).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Returns the effective core fields directory, defaulting to "fields".
    pub fn effective_fields_dir(&self) -> PathBuf {
        self.fields_dir.clone().unwrap_or_else(|| "fields".into())
    }

    /// Returns the effective plugins directory, defaulting to "plugins".
    pub fn effective_plugins_dir(&self) -> PathBuf {
        self.plugins_dir.clone().unwrap_or_else(|| "plugins".into())
    }

    /// Returns the effective database path, defaulting to "loam.db".
    pub fn effective_database(&self) -> PathBuf {
        self.database.clone().unwrap_or_else(|| "loam.db".into())
    }

    /// The manifest path at which a missing field type was expected. Used
    /// in error messages.
    pub fn expected_manifest(&self, handle: &str) -> String {
        self.effective_fields_dir()
            .join(format!("field.{handle}.toml"))
            .display()
            .to_string()
    }
}
