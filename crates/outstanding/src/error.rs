//! Pipeline errors.

use crate::config::ConfigError;
use outstanding_data::LoadError;
use outstanding_normalize::{PolicyError, SchemaError};
use outstanding_output::{ExportError, ReportError};
use thiserror::Error;

/// Anything that stops an upload from reaching the dashboard.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The upload could not be read.
    #[error("Failed to load upload: {0}")]
    Load(#[from] LoadError),

    /// Required columns are missing.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The configured normalization policy is invalid.
    #[error("Invalid normalization policy: {0}")]
    Policy(#[from] PolicyError),

    /// The configuration file could not be used.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Export failed.
    #[error(transparent)]
    Export(#[from] ExportError),

    /// Report generation failed.
    #[error(transparent)]
    Report(#[from] ReportError),

    /// No view is registered under this name.
    #[error("Unknown view: {0}")]
    UnknownView(String),
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
