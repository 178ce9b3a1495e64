//! Raw table model: a header row plus untyped records.

use crate::cell::CellValue;

/// One uploaded row: ordered `(column, value)` pairs.
///
/// No invariants hold for a raw record. Cells may be blank, of mixed types, or
/// missing altogether when a row is shorter than the header.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawRecord {
    fields: Vec<(String, CellValue)>,
}

impl RawRecord {
    /// Create a record from ordered pairs.
    pub const fn new(fields: Vec<(String, CellValue)>) -> Self {
        Self { fields }
    }

    /// Zip a header with row values. Surplus values beyond the header are ignored.
    pub fn from_row(columns: &[String], values: Vec<CellValue>) -> Self {
        let fields = columns.iter().cloned().zip(values).collect();
        Self { fields }
    }

    /// Look up a cell by column name.
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Iterate over `(column, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Number of cells present.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no cells.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Whether every present cell is blank.
    pub fn is_blank(&self) -> bool {
        self.fields.iter().all(|(_, value)| value.is_empty())
    }
}

/// An uploaded table before any cleaning.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    columns: Vec<String>,
    records: Vec<RawRecord>,
}

impl RawTable {
    /// Create a table from a header and its records.
    pub const fn new(columns: Vec<String>, records: Vec<RawRecord>) -> Self {
        Self { columns, records }
    }

    /// Build a table from a header and positional rows.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let records = rows
            .into_iter()
            .map(|row| RawRecord::from_row(&columns, row))
            .collect();
        Self { columns, records }
    }

    /// Header in file order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Records in file order.
    pub fn records(&self) -> &[RawRecord] {
        &self.records
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether the header contains `column`.
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Required columns absent from the header, in the order they were requested.
    pub fn missing_columns<'a>(&self, required: &[&'a str]) -> Vec<&'a str> {
        required
            .iter()
            .copied()
            .filter(|column| !self.has_column(column))
            .collect()
    }

    /// The first `n` records, for previews.
    pub fn head(&self, n: usize) -> &[RawRecord] {
        &self.records[..n.min(self.records.len())]
    }
}
