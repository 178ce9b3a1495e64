//! Reading uploads into a [`RawTable`].
//!
//! Two upload formats are accepted: delimited text and spreadsheet workbooks.
//! The first row is always the header. Fully blank rows are skipped.

use crate::cell::CellValue;
use crate::error::{LoadError, Result};
use crate::table::{RawRecord, RawTable};
use calamine::{Data, Range, Reader, open_workbook_auto};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Upload format, decided from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Delimited text (`.csv`, `.txt`).
    Csv,

    /// Spreadsheet workbook (`.xlsx`, `.xlsm`, `.xlsb`, `.xls`, `.ods`).
    Spreadsheet,
}

impl SourceFormat {
    /// Detect the format of `path` from its extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "csv" | "txt" => Ok(Self::Csv),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(Self::Spreadsheet),
            _ => Err(LoadError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Options for delimited text uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvOptions {
    /// Field delimiter (default: `,`).
    pub delimiter: u8,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

/// Load an upload from disk, choosing the reader from the file extension.
pub fn load_path(path: &Path, options: CsvOptions) -> Result<RawTable> {
    match SourceFormat::from_path(path)? {
        SourceFormat::Csv => {
            let file = File::open(path)?;
            load_csv(file, &path.display().to_string(), options)
        }
        SourceFormat::Spreadsheet => load_workbook(path),
    }
}

/// Load delimited text from any reader, e.g. an in-memory upload.
pub fn load_csv<R: Read>(reader: R, source_name: &str, options: CsvOptions) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let columns: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|header| header.trim().to_string())
        .collect();
    if columns.iter().all(String::is_empty) {
        return Err(LoadError::MissingHeader {
            source_name: source_name.to_string(),
        });
    }

    let mut records = Vec::new();
    let mut blank = 0usize;
    for result in rdr.records() {
        let row = result?;
        let values = row.iter().map(CellValue::from_text).collect();
        let record = RawRecord::from_row(&columns, values);
        if record.is_blank() {
            blank += 1;
            continue;
        }
        records.push(record);
    }

    if blank > 0 {
        debug!(source = source_name, blank, "skipped blank rows");
    }
    info!(source = source_name, rows = records.len(), columns = columns.len(), "loaded csv");

    Ok(RawTable::new(columns, records))
}

/// Load the first worksheet of a workbook.
pub fn load_workbook(path: &Path) -> Result<RawTable> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(LoadError::NoWorksheet)?;
    let range = workbook.worksheet_range(&sheet)?;
    let table = range_to_table(&range, &path.display().to_string())?;

    info!(
        source = %path.display(),
        sheet = %sheet,
        rows = table.len(),
        columns = table.columns().len(),
        "loaded workbook"
    );

    Ok(table)
}

/// First row of `range` is the header; fully blank rows are skipped.
fn range_to_table(range: &Range<Data>, source_name: &str) -> Result<RawTable> {
    let mut rows = range.rows();
    let columns: Vec<String> = rows
        .next()
        .map(|header| header.iter().map(|cell| cell_to_value(cell).to_string()).collect())
        .ok_or_else(|| LoadError::MissingHeader {
            source_name: source_name.to_string(),
        })?;

    let records = rows
        .map(|row| RawRecord::from_row(&columns, row.iter().map(cell_to_value).collect()))
        .filter(|record| !record.is_blank())
        .collect();

    Ok(RawTable::new(columns, records))
}

fn cell_to_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::from_text(s),
        Data::Float(v) => CellValue::Float(*v),
        Data::Int(v) => CellValue::Int(*v),
        Data::Bool(v) => CellValue::Bool(*v),
        Data::DateTime(dt) => dt.as_datetime().map_or(CellValue::Float(dt.as_f64()), |dt| {
            if dt.time() == chrono::NaiveTime::MIN {
                CellValue::Date(dt.date())
            } else {
                CellValue::DateTime(dt)
            }
        }),
        Data::Error(_) => CellValue::Empty,
    }
}
