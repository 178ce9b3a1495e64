//! Error types for normalization.

use thiserror::Error;

/// Required columns are absent from the uploaded header.
///
/// Raised before any row is parsed; lists every missing column.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Missing required columns: {}", .missing.join(", "))]
pub struct SchemaError {
    /// Missing column names, in the order they were required.
    pub missing: Vec<String>,
}

/// A normalization policy that cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// Thousands and decimal separators are the same character
    #[error("Thousands and decimal separator are both '{0}'")]
    SameSeparator(char),

    /// The month lookup table is empty
    #[error("Month table is empty")]
    EmptyMonthTable,

    /// A month table entry is blank or out of range
    #[error("Invalid month table entry '{needle}' -> {month}")]
    InvalidMonth {
        /// Substring of the entry
        needle: String,
        /// Month number of the entry
        month: u32,
    },

    /// The audit marker is blank
    #[error("Audit marker is empty")]
    EmptyAuditMarker,

    /// Year pattern failed to compile
    #[error("Invalid year pattern: {0}")]
    Pattern(String),
}

/// Errors that can occur while setting up or running normalization.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// Missing required columns
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Invalid policy
    #[error("Invalid normalization policy: {0}")]
    Policy(#[from] PolicyError),
}

/// Result type for normalization setup.
pub type Result<T> = std::result::Result<T, NormalizeError>;
