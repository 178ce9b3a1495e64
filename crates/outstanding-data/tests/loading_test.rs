//! Integration tests for loading uploads from disk

use outstanding_data::{CellValue, CsvOptions, LoadError, load_path};
use std::io::Write;
use tempfile::Builder;

fn write_upload(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
    write!(file, "{}", content).unwrap();
    file
}

#[test]
fn test_load_csv_file() {
    let file = write_upload(
        ".csv",
        "Periode,Jenis,Generasi,Value,Jumlah Debitur\n\
         2024-01-31,KUR,1,1.500.000,120\n\
         2024-02-29,PEN,2,2.250.000,80\n",
    );

    let table = load_path(file.path(), CsvOptions::default()).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(
        table.columns(),
        ["Periode", "Jenis", "Generasi", "Value", "Jumlah Debitur"]
    );
    assert!(table.missing_columns(&["Periode", "Value"]).is_empty());

    let first = &table.records()[0];
    assert_eq!(first.get("Jenis"), Some(&CellValue::Text("KUR".to_string())));
    assert_eq!(first.get("Generasi"), Some(&CellValue::Text("1".to_string())));
}

#[test]
fn test_load_unsupported_extension() {
    let file = write_upload(".json", "{}");
    let err = load_path(file.path(), CsvOptions::default()).unwrap_err();
    assert!(matches!(err, LoadError::UnsupportedFormat(_)));
}

#[test]
fn test_corrupt_workbook_is_load_error() {
    let file = write_upload(".xlsx", "this is not a zip archive");
    let err = load_path(file.path(), CsvOptions::default()).unwrap_err();
    assert!(matches!(err, LoadError::Workbook(_)));
}

#[test]
fn test_missing_file_is_io_error() {
    let err = load_path(
        std::path::Path::new("/nonexistent/outstanding.csv"),
        CsvOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, LoadError::Io(_)));
}
