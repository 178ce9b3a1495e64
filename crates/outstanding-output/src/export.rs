//! CSV and JSON export.
//!
//! The dataset CSV is the filtered-table download: UTF-8, comma-delimited, a
//! single header row with the normalized columns and no index column. The
//! period column is written as an ISO date and amounts as cleaned numbers with
//! a `.` decimal point. The download is presentation output: it is not meant
//! to be uploaded again, since the upload policy reads `.` as a thousands
//! separator and the audit marker of the period text is only kept in
//! `is_audited`.

use outstanding_analytics::{AggregationResult, PeriodChange};
use outstanding_normalize::{
    AUDITED_COLUMN, Dataset, NormalizedRecord, PERIOD_KEY_COLUMN, PERIOD_LABEL_COLUMN,
};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialized output was not valid UTF-8.
    #[error("Encoding error: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Comma-separated values format.
    #[default]
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }

    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, ExportError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        ext.parse()
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "pretty" | "pretty-json" | "pretty_json" => Ok(Self::PrettyJson),
            other => Err(ExportError::InvalidFormat(other.to_string())),
        }
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        info!(path = %path.display(), bytes = content.len(), "exported");
        Ok(())
    }
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String, ExportError> {
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

fn json(value: &impl serde::Serialize, format: ExportFormat) -> Result<String, ExportError> {
    match format {
        ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(value)?),
        _ => Ok(serde_json::to_string(value)?),
    }
}

/// Text of `column` in `record` as it appears in the download.
fn cell_text(dataset: &Dataset, record: &NormalizedRecord, column: &str) -> String {
    let schema = dataset.schema();
    if column == schema.period {
        record.date().format("%Y-%m-%d").to_string()
    } else if column == schema.value {
        record.value().to_string()
    } else if schema.debtors.as_deref() == Some(column) {
        record.debtors().map(|d| d.to_string()).unwrap_or_default()
    } else if column == PERIOD_KEY_COLUMN {
        record.period_key().to_string()
    } else if column == PERIOD_LABEL_COLUMN {
        record.period_label().to_string()
    } else if column == AUDITED_COLUMN {
        record.is_audited().to_string()
    } else {
        record.get(column).map(ToString::to_string).unwrap_or_default()
    }
}

/// JSON value of `column` in `record`.
fn cell_json(dataset: &Dataset, record: &NormalizedRecord, column: &str) -> Result<Value, ExportError> {
    let schema = dataset.schema();
    let value = if column == schema.period {
        Value::String(record.date().format("%Y-%m-%d").to_string())
    } else if column == schema.value {
        Value::from(record.value())
    } else if schema.debtors.as_deref() == Some(column) {
        record.debtors().map_or(Value::Null, Value::from)
    } else if column == PERIOD_KEY_COLUMN {
        Value::from(record.period_key())
    } else if column == PERIOD_LABEL_COLUMN {
        Value::String(record.period_label().to_string())
    } else if column == AUDITED_COLUMN {
        Value::Bool(record.is_audited())
    } else {
        match record.get(column) {
            Some(cell) => serde_json::to_value(cell)?,
            None => Value::Null,
        }
    };
    Ok(value)
}

impl Exporter for Dataset {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        let columns = self.columns();
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                wtr.write_record(&columns)?;
                for record in self {
                    wtr.write_record(columns.iter().map(|c| cell_text(self, record, c)))?;
                }
                finish(wtr)
            }
            ExportFormat::Json | ExportFormat::PrettyJson => {
                let rows = self
                    .iter()
                    .map(|record| {
                        columns
                            .iter()
                            .map(|c| Ok(((*c).to_string(), cell_json(self, record, c)?)))
                            .collect::<Result<Map<String, Value>, ExportError>>()
                            .map(Value::Object)
                    })
                    .collect::<Result<Vec<Value>, ExportError>>()?;
                json(&rows, format)
            }
        }
    }
}

impl Exporter for AggregationResult {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                let mut header = self.group_columns.clone();
                header.push(self.value_column.clone());
                wtr.write_record(&header)?;
                for row in &self.rows {
                    let mut fields: Vec<String> = row.keys.iter().map(ToString::to_string).collect();
                    fields.push(row.value.to_string());
                    wtr.write_record(&fields)?;
                }
                finish(wtr)
            }
            ExportFormat::Json | ExportFormat::PrettyJson => json(self, format),
        }
    }
}

impl Exporter for Vec<PeriodChange> {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                wtr.write_record(["period", "previous", "current", "absolute", "percent"])?;
                for change in self {
                    wtr.write_record([
                        change.period.to_string(),
                        change.previous.to_string(),
                        change.current.to_string(),
                        change.absolute.to_string(),
                        change.percent.to_string(),
                    ])?;
                }
                finish(wtr)
            }
            ExportFormat::Json | ExportFormat::PrettyJson => json(self, format),
        }
    }
}
