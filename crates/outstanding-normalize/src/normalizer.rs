//! Table-wide normalization.
//!
//! Applies the period and value parsers to every row of an upload. Rows whose
//! period or amount cannot be read, or whose category cell is blank, are
//! dropped, not reported as errors; the [`NormalizationReport`] records which
//! rows went and why.

use crate::dataset::{Dataset, NormalizedRecord};
use crate::error::{PolicyError, SchemaError};
use crate::period::PeriodParser;
use crate::policy::NormalizationPolicy;
use crate::schema::ColumnSchema;
use crate::value::ValueParser;
use outstanding_data::{CellValue, RawRecord, RawTable};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};

/// Why a row was left out of the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// The period cell did not resolve to a month and year.
    UnparsablePeriod,
    /// The amount cell did not resolve to a number.
    UnparsableValue,
    /// A category column of the upload has a blank cell.
    MissingCategory,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnparsablePeriod => f.write_str("unparsable period"),
            Self::UnparsableValue => f.write_str("unparsable value"),
            Self::MissingCategory => f.write_str("missing category"),
        }
    }
}

/// A row excluded from the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DroppedRow {
    /// 0-based index of the data row in the upload.
    pub index: usize,
    /// Reason for dropping.
    pub reason: DropReason,
}

/// Diagnostics of one normalization pass.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct NormalizationReport {
    /// Data rows read from the upload.
    pub total_rows: usize,
    /// Rows left out, in upload order.
    pub dropped: Vec<DroppedRow>,
}

impl NormalizationReport {
    /// Number of rows dropped.
    pub fn dropped_count(&self) -> usize {
        self.dropped.len()
    }

    /// Number of rows kept.
    pub fn kept_count(&self) -> usize {
        self.total_rows - self.dropped.len()
    }

    /// Number of rows dropped for `reason`.
    pub fn count_by_reason(&self, reason: DropReason) -> usize {
        self.dropped.iter().filter(|row| row.reason == reason).count()
    }
}

/// Result of normalizing an upload.
#[derive(Debug, Clone)]
pub struct Normalized {
    /// Cleaned records.
    pub dataset: Dataset,
    /// Drop diagnostics.
    pub report: NormalizationReport,
}

/// Applies [`PeriodParser`] and [`ValueParser`] across a [`RawTable`].
#[derive(Debug, Clone)]
pub struct TableNormalizer {
    schema: ColumnSchema,
    values: ValueParser,
    periods: PeriodParser,
}

impl TableNormalizer {
    /// Create a normalizer for uploads laid out as `schema`.
    pub fn new(policy: &NormalizationPolicy, schema: ColumnSchema) -> Result<Self, PolicyError> {
        Ok(Self {
            schema,
            values: ValueParser::new(policy),
            periods: PeriodParser::new(policy)?,
        })
    }

    /// Column layout in use.
    pub const fn schema(&self) -> &ColumnSchema {
        &self.schema
    }

    /// Period parser in use.
    pub const fn period_parser(&self) -> &PeriodParser {
        &self.periods
    }

    /// Normalize `table`, requiring every column the schema names.
    pub fn normalize_table(&self, table: &RawTable) -> Result<Normalized, SchemaError> {
        self.normalize(table, &self.schema.required_columns())
    }

    /// Normalize `table` after checking that every column in `required` is present.
    ///
    /// The column check runs before any row is parsed. The input table is not
    /// modified.
    pub fn normalize(&self, table: &RawTable, required: &[&str]) -> Result<Normalized, SchemaError> {
        let missing = table.missing_columns(required);
        if !missing.is_empty() {
            return Err(SchemaError {
                missing: missing.into_iter().map(String::from).collect(),
            });
        }

        let mut records = Vec::with_capacity(table.len());
        let mut report = NormalizationReport {
            total_rows: table.len(),
            dropped: Vec::new(),
        };

        for (index, raw) in table.records().iter().enumerate() {
            match self.normalize_record(raw) {
                Ok(record) => records.push(record),
                Err(reason) => {
                    debug!(row = index, %reason, "dropping row");
                    report.dropped.push(DroppedRow { index, reason });
                }
            }
        }

        if records.is_empty() && !table.is_empty() {
            warn!(rows = table.len(), "no row survived normalization");
        }
        info!(
            kept = records.len(),
            dropped = report.dropped_count(),
            "normalized table"
        );

        let dataset = Dataset::new(table.columns().to_vec(), self.schema.clone(), records);
        Ok(Normalized { dataset, report })
    }

    /// Normalize a single row.
    ///
    /// A category column the upload does not carry is not checked; a blank cell
    /// in one it does carry drops the row.
    pub fn normalize_record(&self, raw: &RawRecord) -> Result<NormalizedRecord, DropReason> {
        let period_cell = raw.get(&self.schema.period).unwrap_or(&CellValue::Empty);
        let period = self
            .periods
            .parse_info(period_cell)
            .ok_or(DropReason::UnparsablePeriod)?;

        let value_cell = raw.get(&self.schema.value).unwrap_or(&CellValue::Empty);
        let value = self
            .values
            .parse(value_cell)
            .ok_or(DropReason::UnparsableValue)?;

        if self
            .schema
            .categories
            .iter()
            .any(|column| raw.get(column).is_some_and(CellValue::is_empty))
        {
            return Err(DropReason::MissingCategory);
        }

        let debtors = self
            .schema
            .debtors
            .as_deref()
            .and_then(|column| raw.get(column))
            .and_then(ValueParser::parse_plain);

        Ok(NormalizedRecord::new(raw.clone(), value, debtors, period))
    }
}
