//! Normalized records and the dataset they form.

use crate::period::{Period, PeriodInfo};
use crate::schema::{AUDITED_COLUMN, ColumnSchema, PERIOD_KEY_COLUMN, PERIOD_LABEL_COLUMN};
use chrono::NaiveDate;
use outstanding_data::{CellValue, RawRecord};
use std::collections::{BTreeMap, HashSet};

/// One upload row after normalization.
///
/// Created once by the normalizer and never modified afterwards. The raw cells
/// are kept alongside the cleaned fields so other columns stay available.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    raw: RawRecord,
    value: f64,
    debtors: Option<f64>,
    period: PeriodInfo,
}

impl NormalizedRecord {
    /// Assemble a record from its raw cells and cleaned fields.
    pub const fn new(raw: RawRecord, value: f64, debtors: Option<f64>, period: PeriodInfo) -> Self {
        Self {
            raw,
            value,
            debtors,
            period,
        }
    }

    /// Original cells.
    pub const fn raw(&self) -> &RawRecord {
        &self.raw
    }

    /// Original cell of `column`.
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.raw.get(column)
    }

    /// Category value of `column` as text; `None` when the cell is absent or blank.
    pub fn category(&self, column: &str) -> Option<String> {
        self.raw
            .get(column)
            .filter(|cell| !cell.is_empty())
            .map(ToString::to_string)
    }

    /// Cleaned outstanding amount.
    pub const fn value(&self) -> f64 {
        self.value
    }

    /// Cleaned debtor count, if the upload has one and it parsed.
    pub const fn debtors(&self) -> Option<f64> {
        self.debtors
    }

    /// Calendar month.
    pub const fn period(&self) -> Period {
        self.period.period
    }

    /// Calendar date used for date-range filtering.
    pub const fn date(&self) -> NaiveDate {
        self.period.date
    }

    /// `year * 100 + month`.
    pub const fn period_key(&self) -> i32 {
        self.period.key
    }

    /// Display label, e.g. `"Jan 2024"`.
    pub fn period_label(&self) -> &str {
        &self.period.label
    }

    /// Whether the period text was marked audited.
    pub const fn is_audited(&self) -> bool {
        self.period.audited
    }
}

/// An ordered collection of normalized records sharing one schema.
///
/// Carries the distinct values of each categorical column (in first-appearance
/// order) so filter controls can be populated from it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    raw_columns: Vec<String>,
    schema: ColumnSchema,
    records: Vec<NormalizedRecord>,
    domains: BTreeMap<String, Vec<String>>,
}

impl Dataset {
    /// Create a dataset and compute its category domains.
    pub fn new(raw_columns: Vec<String>, schema: ColumnSchema, records: Vec<NormalizedRecord>) -> Self {
        let domains = category_domains(&schema, &records);
        Self {
            raw_columns,
            schema,
            records,
            domains,
        }
    }

    /// A dataset with the same schema holding `records`.
    pub fn with_records(&self, records: Vec<NormalizedRecord>) -> Self {
        Self::new(self.raw_columns.clone(), self.schema.clone(), records)
    }

    /// Column layout used to build this dataset.
    pub const fn schema(&self) -> &ColumnSchema {
        &self.schema
    }

    /// Upload header in file order.
    pub fn raw_columns(&self) -> &[String] {
        &self.raw_columns
    }

    /// Normalized schema: the upload header followed by the derived columns.
    pub fn columns(&self) -> Vec<&str> {
        let mut columns: Vec<&str> = self.raw_columns.iter().map(String::as_str).collect();
        for derived in [PERIOD_KEY_COLUMN, PERIOD_LABEL_COLUMN, AUDITED_COLUMN] {
            if !columns.contains(&derived) {
                columns.push(derived);
            }
        }
        columns
    }

    /// Records in upload order.
    pub fn records(&self) -> &[NormalizedRecord] {
        &self.records
    }

    /// Iterate over records in upload order.
    pub fn iter(&self) -> std::slice::Iter<'_, NormalizedRecord> {
        self.records.iter()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct values of a categorical column, in first-appearance order.
    pub fn category_domain(&self, column: &str) -> Option<&[String]> {
        self.domains.get(column).map(Vec::as_slice)
    }

    /// All category domains keyed by column.
    pub const fn category_domains(&self) -> &BTreeMap<String, Vec<String>> {
        &self.domains
    }

    /// Earliest and latest period.
    pub fn period_range(&self) -> Option<(Period, Period)> {
        let min = self.records.iter().map(NormalizedRecord::period).min()?;
        let max = self.records.iter().map(NormalizedRecord::period).max()?;
        Some((min, max))
    }

    /// Earliest and latest calendar date, the default bounds of a date-range filter.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.records.iter().map(NormalizedRecord::date).min()?;
        let max = self.records.iter().map(NormalizedRecord::date).max()?;
        Some((min, max))
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a NormalizedRecord;
    type IntoIter = std::slice::Iter<'a, NormalizedRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

fn category_domains(
    schema: &ColumnSchema,
    records: &[NormalizedRecord],
) -> BTreeMap<String, Vec<String>> {
    schema
        .categories
        .iter()
        .map(|column| {
            let mut seen = HashSet::new();
            let mut values = Vec::new();
            for value in records.iter().filter_map(|r| r.category(column)) {
                if seen.insert(value.clone()) {
                    values.push(value);
                }
            }
            (column.clone(), values)
        })
        .collect()
}
