//! Integration tests for the normalization pipeline

use chrono::NaiveDate;
use outstanding_data::{CsvOptions, load_csv};
use outstanding_normalize::{
    ColumnSchema, DropReason, NormalizationPolicy, Period, PeriodParser, TableNormalizer,
    ValueParser,
};

const UPLOAD: &str = "\
Periode,Jenis,Generasi,Value,Jumlah Debitur
2023-12-31,KUR,1,\"1.250.000,50\",100
Des 2023 (Audited),KUR,1,1.300.000,100
2024-01-31,KUR,2,2.000.000,150
2024-01-31,PEN,1,abc,20
Laporan Feb 2024,PEN,1,750.000,30
";

fn normalizer() -> TableNormalizer {
    TableNormalizer::new(&NormalizationPolicy::default(), ColumnSchema::default()).unwrap()
}

#[test]
fn test_csv_upload_to_dataset() {
    let table = load_csv(UPLOAD.as_bytes(), "upload.csv", CsvOptions::default()).unwrap();
    let normalized = normalizer().normalize_table(&table).unwrap();
    let dataset = &normalized.dataset;

    assert_eq!(dataset.len(), 4);
    assert_eq!(normalized.report.dropped_count(), 1);
    assert_eq!(normalized.report.count_by_reason(DropReason::UnparsableValue), 1);

    let first = &dataset.records()[0];
    assert_eq!(first.value(), 1_250_000.5);
    assert_eq!(first.period_key(), 202312);
    assert_eq!(first.period_label(), "Des 2023");
    assert!(!first.is_audited());
    assert_eq!(first.date(), NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());

    let audited = &dataset.records()[1];
    assert_eq!(audited.period_key(), 202312);
    assert!(audited.is_audited());
    assert_eq!(audited.date(), NaiveDate::from_ymd_opt(2023, 12, 1).unwrap());

    assert_eq!(
        dataset.category_domain("Jenis").unwrap(),
        ["KUR".to_string(), "PEN".to_string()]
    );
    assert_eq!(
        dataset.category_domain("Generasi").unwrap(),
        ["1".to_string(), "2".to_string()]
    );
    assert_eq!(
        dataset.period_range(),
        Some((Period::new(2023, 12).unwrap(), Period::new(2024, 2).unwrap()))
    );
    assert_eq!(
        dataset.date_range(),
        Some((
            NaiveDate::from_ymd_opt(2023, 12, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
        ))
    );
}

#[test]
fn test_normalized_schema_appends_derived_columns() {
    let table = load_csv(UPLOAD.as_bytes(), "upload.csv", CsvOptions::default()).unwrap();
    let dataset = normalizer().normalize_table(&table).unwrap().dataset;
    assert_eq!(
        dataset.columns(),
        vec![
            "Periode",
            "Jenis",
            "Generasi",
            "Value",
            "Jumlah Debitur",
            "period_key",
            "period_label",
            "is_audited"
        ]
    );
}

#[test]
fn test_renormalizing_is_deterministic() {
    let table = load_csv(UPLOAD.as_bytes(), "upload.csv", CsvOptions::default()).unwrap();
    let first = normalizer().normalize_table(&table).unwrap();
    let second = normalizer().normalize_table(&table).unwrap();
    assert_eq!(first.dataset, second.dataset);
    assert_eq!(first.report, second.report);
}

#[test]
fn test_iso_dates_ignore_day() {
    let parser = PeriodParser::new(&NormalizationPolicy::default()).unwrap();
    let mut date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2021, 12, 31).unwrap();
    while date <= end {
        let raw = date.format("%Y-%m-%d").to_string();
        let period = parser.parse(&raw.as_str().into()).unwrap();
        assert_eq!(period, Period::from_date(date), "failed for {raw}");
        date = date.succ_opt().unwrap();
    }
}

#[test]
fn test_thousands_only_values() {
    let parser = ValueParser::default();
    for (raw, expected) in [
        ("1.234.567", 1_234_567.0),
        ("12.345", 12_345.0),
        ("999", 999.0),
        ("1.000.000.000", 1_000_000_000.0),
    ] {
        assert_eq!(parser.parse_str(raw), Some(expected), "failed for {raw}");
    }
}

#[test]
fn test_category_domain_keeps_first_appearance() {
    let upload = "\
Periode,Jenis,Generasi,Value,Jumlah Debitur
Jan 2024,PEN,2,1,1
Jan 2024,KUR,1,1,1
Feb 2024,PEN,1,1,1
Feb 2024,Lainnya,2,1,1
Mar 2024,KUR,3,1,1
Mar 2024,PEN,2,1,1
";
    let table = load_csv(upload.as_bytes(), "upload.csv", CsvOptions::default()).unwrap();
    let dataset = normalizer().normalize_table(&table).unwrap().dataset;
    assert_eq!(
        dataset.category_domain("Jenis").unwrap(),
        ["PEN", "KUR", "Lainnya"].map(String::from)
    );
    assert_eq!(
        dataset.category_domain("Generasi").unwrap(),
        ["2", "1", "3"].map(String::from)
    );
}
