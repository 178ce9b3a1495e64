//! Shared test data.

use outstanding_data::{CellValue, RawTable};
use outstanding_normalize::{ColumnSchema, Dataset, NormalizationPolicy, TableNormalizer};

/// Build a dataset from `(Periode, Jenis, Generasi, Value, Jumlah Debitur)` rows.
pub(crate) fn dataset(rows: &[[&str; 5]]) -> Dataset {
    let columns = ["Periode", "Jenis", "Generasi", "Value", "Jumlah Debitur"]
        .map(String::from)
        .to_vec();
    let rows = rows
        .iter()
        .map(|row| row.iter().map(|cell| CellValue::from_text(cell)).collect())
        .collect();
    TableNormalizer::new(&NormalizationPolicy::default(), ColumnSchema::default())
        .unwrap()
        .normalize_table(&RawTable::from_rows(columns, rows))
        .unwrap()
        .dataset
}

/// Three months of KUR/PEN figures with an audited restatement of December.
pub(crate) fn portfolio() -> Dataset {
    dataset(&[
        ["2023-11-30", "KUR", "1", "100", "10"],
        ["2023-11-30", "PEN", "1", "50", "5"],
        ["2023-12-31", "KUR", "1", "120", "11"],
        ["Des 2023 (Audited)", "KUR", "1", "125", "11"],
        ["2023-12-31", "PEN", "2", "60", "6"],
        ["2024-01-31", "KUR", "2", "130", "12"],
        ["2024-01-31", "PEN", "2", "70", ""],
    ])
}
