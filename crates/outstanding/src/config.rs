//! Configuration file handling.
//!
//! A JSON file holding the normalization policy, the column layout and CSV
//! options. Every field is optional; missing ones take the Indonesian defaults.

use outstanding_data::CsvOptions;
use outstanding_normalize::{ColumnSchema, NormalizationPolicy, PolicyError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Io {
        /// Config file path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// The file is not valid configuration JSON.
    #[error("Failed to parse config {path}: {source}")]
    Parse {
        /// Config file path
        path: PathBuf,
        /// Underlying error
        source: serde_json::Error,
    },

    /// The policy in the file is inconsistent.
    #[error("Invalid policy in config: {0}")]
    Policy(#[from] PolicyError),
}

/// Pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Separator, month-name and audit conventions.
    pub policy: NormalizationPolicy,
    /// Which columns hold the period, amounts and categories.
    pub schema: ColumnSchema,
    /// Options for CSV uploads.
    pub csv: CsvOptions,
    /// Columns that must be present; defaults to every column of `schema`.
    pub required_columns: Option<Vec<String>>,
}

/// Get the default config file path.
///
/// Uses platform-specific config directories:
/// - Linux: `~/.config/outstanding/config.json`
/// - macOS: `~/Library/Application Support/outstanding/config.json`
/// - Windows: `%APPDATA%\outstanding\config.json`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("outstanding").join("config.json"))
}

impl Config {
    /// Read and validate the config file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Parse and validate configuration JSON.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.policy.validate()?;
        Ok(config)
    }

    /// Load `explicit` if given, otherwise the default file when it exists,
    /// otherwise the built-in defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match default_config_path().filter(|path| path.is_file()) {
            Some(path) => {
                debug!(path = %path.display(), "using default config file");
                Self::load(&path)
            }
            None => Ok(Self::default()),
        }
    }

    /// Columns checked before normalization.
    pub fn required_columns(&self) -> Vec<&str> {
        self.required_columns.as_ref().map_or_else(
            || self.schema.required_columns(),
            |columns| columns.iter().map(String::as_str).collect(),
        )
    }
}
