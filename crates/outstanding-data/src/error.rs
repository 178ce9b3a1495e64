//! Error types for loading uploads.

use thiserror::Error;

/// Result type for loading operations.
pub type Result<T> = std::result::Result<T, LoadError>;

/// Errors that can occur while reading an uploaded file.
#[derive(Debug, Error)]
pub enum LoadError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Workbook could not be opened or read
    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    /// File extension is not a supported upload format
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Workbook contains no worksheets
    #[error("Workbook has no worksheets")]
    NoWorksheet,

    /// Input has no header row
    #[error("Missing header row in {source_name}")]
    MissingHeader {
        /// Name of the file or stream that was read
        source_name: String,
    },
}
