//! End-to-end filtering and aggregation over a normalized upload.

use approx::assert_relative_eq;
use chrono::NaiveDate;
use outstanding_analytics::{
    DateRange, FilterEngine, FilterSpec, GroupKey, Scale, TieBreak, ValueColumn, build_view,
    last_by, period_changes, sum_by,
};
use outstanding_data::{CsvOptions, load_csv};
use outstanding_normalize::{
    ColumnSchema, Dataset, DropReason, NormalizationPolicy, TableNormalizer,
};
use rstest::{fixture, rstest};

const UPLOAD: &str = "\
Periode,Jenis,Generasi,Value,Jumlah Debitur
Jan 2023,KUR,1,\"1.250.000.000.000\",1200
Jan 2023,PEN,1,\"300.000.000.000,50\",80
Feb 2023,KUR,1,\"1.300.000.000.000\",1210
Feb 2023,PEN,2,\"310.000.000.000\",
Mar 2023,KUR,2,\"1.350.000.000.000\",1250
Mar 2023 (Audited),KUR,2,\"1.400.000.000.000\",1250
Mar 2023,Lainnya,2,abc,3
";

#[fixture]
fn dataset() -> Dataset {
    let raw = load_csv(UPLOAD.as_bytes(), "upload.csv", CsvOptions::default()).unwrap();
    let normalizer =
        TableNormalizer::new(&NormalizationPolicy::default(), ColumnSchema::default()).unwrap();
    let normalized = normalizer.normalize(&raw, &["Periode", "Value"]).unwrap();
    assert_eq!(normalized.report.dropped_count(), 1);
    normalized.dataset
}

#[rstest]
fn test_widest_filter_preserves_totals(dataset: Dataset) {
    let spec = FilterSpec::select_all(&dataset);
    let filtered = FilterEngine::apply(&dataset, &spec);

    let direct: f64 = dataset.iter().map(|r| r.value()).sum();
    let grouped = sum_by(&filtered, &[GroupKey::category("Jenis")], ValueColumn::Value);
    assert_relative_eq!(grouped.total(), direct, max_relative = 1e-12);
    assert_eq!(
        grouped.get(&["PEN"]),
        Some(300_000_000_000.5 + 310_000_000_000.0)
    );
}

#[rstest]
fn test_audited_value_wins(dataset: Dataset) {
    let latest = last_by(
        &dataset,
        &[GroupKey::category("Jenis")],
        ValueColumn::Value,
        TieBreak::Audited,
    );
    assert_eq!(latest.get(&["KUR"]), Some(1_400_000_000_000.0));
    assert_eq!(latest.get(&["PEN"]), Some(310_000_000_000.0));
}

#[rstest]
fn test_filtered_trend_in_trillions(dataset: Dataset) {
    let start = NaiveDate::from_ymd_opt(2023, 2, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2023, 3, 31).unwrap();
    let spec = FilterSpec::select_all(&dataset)
        .select("Jenis", ["KUR"])
        .with_range(DateRange::new(start, end));
    let filtered = FilterEngine::apply(&dataset, &spec);
    assert_eq!(filtered.len(), 3);

    let totals = build_view("period_totals", dataset.schema())
        .unwrap()
        .aggregate(&filtered)
        .scaled(Scale::Trillion);
    assert_eq!(totals.len(), 2);
    assert_relative_eq!(totals.rows[0].value, 1.3, max_relative = 1e-12);
    assert_relative_eq!(totals.rows[1].value, 1.4, max_relative = 1e-12);

    let changes = period_changes(&totals);
    assert_eq!(changes.len(), 1);
    assert_relative_eq!(changes[0].percent, 0.1 / 1.3 * 100.0, max_relative = 1e-9);
}

#[rstest]
fn test_empty_filter_result_aggregates_to_nothing(dataset: Dataset) {
    let spec = FilterSpec::select_all(&dataset).select_none("Jenis");
    let filtered = FilterEngine::apply(&dataset, &spec);
    assert!(filtered.is_empty());
    assert!(!dataset.is_empty());
    assert!(sum_by(&filtered, &[GroupKey::Period], ValueColumn::Value).is_empty());
}

#[test]
fn test_blank_category_rows_keep_widest_filter_total() {
    let upload = "\
Periode,Jenis,Generasi,Value,Jumlah Debitur
Jan 2024,KUR,1,10,1
Jan 2024,,1,20,1
Feb 2024,PEN,,30,2
Feb 2024,PEN,2,40,2
";
    let raw = load_csv(upload.as_bytes(), "upload.csv", CsvOptions::default()).unwrap();
    let normalizer =
        TableNormalizer::new(&NormalizationPolicy::default(), ColumnSchema::default()).unwrap();
    let normalized = normalizer.normalize_table(&raw).unwrap();
    assert_eq!(
        normalized.report.count_by_reason(DropReason::MissingCategory),
        2
    );

    let dataset = normalized.dataset;
    let direct: f64 = dataset.iter().map(|r| r.value()).sum();
    let filtered = FilterEngine::apply(&dataset, &FilterSpec::select_all(&dataset));
    assert_eq!(filtered.len(), dataset.len());

    for column in ["Jenis", "Generasi"] {
        let grouped = sum_by(&filtered, &[GroupKey::category(column)], ValueColumn::Value);
        assert_relative_eq!(grouped.total(), direct);
    }
    assert_relative_eq!(direct, 50.0);
}
