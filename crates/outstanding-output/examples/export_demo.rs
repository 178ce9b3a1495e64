//! Demonstration of the export functionality in outstanding-output.

use outstanding_analytics::{GroupKey, Scale, ValueColumn, period_changes, sum_by};
use outstanding_data::{CsvOptions, load_csv};
use outstanding_normalize::{ColumnSchema, NormalizationPolicy, TableNormalizer};
use outstanding_output::{ExportFormat, Exporter, KpiSummary, aggregation_frame};

const UPLOAD: &str = "\
Periode,Jenis,Generasi,Value,Jumlah Debitur
Nov 2023,KUR,1,\"1.250.000.000.000\",1200
Nov 2023,PEN,1,\"300.000.000.000,50\",80
Des 2023,KUR,1,\"1.300.000.000.000\",1210
Des 2023 (Audited),KUR,1,\"1.320.000.000.000\",1210
Des 2023,PEN,2,\"310.000.000.000\",82
";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Outstanding Export Demo ===\n");

    let raw = load_csv(UPLOAD.as_bytes(), "demo.csv", CsvOptions::default())?;
    let normalizer =
        TableNormalizer::new(&NormalizationPolicy::default(), ColumnSchema::default())?;
    let dataset = normalizer.normalize_table(&raw)?.dataset;

    // 1. Dataset download
    println!("1. Dataset Download\n");
    println!("CSV Format:");
    println!("{}", dataset.export_to_string(ExportFormat::Csv)?);

    // 2. Grouped totals
    println!("2. Outstanding by Jenis\n");
    let by_type = sum_by(&dataset, &[GroupKey::category("Jenis")], ValueColumn::Value)
        .scaled(Scale::Trillion);
    println!("Pretty JSON Format:");
    println!("{}\n", by_type.export_to_string(ExportFormat::PrettyJson)?);
    println!("DataFrame:");
    println!("{}\n", aggregation_frame(&by_type)?);

    // 3. Period-over-period changes
    println!("3. Period Changes\n");
    let totals = sum_by(&dataset, &[GroupKey::Period], ValueColumn::Value);
    println!("{}", period_changes(&totals).export_to_string(ExportFormat::Csv)?);

    // 4. KPIs
    println!("4. KPI Summary\n");
    println!("{}", KpiSummary::from_dataset(&dataset, Scale::Trillion));

    Ok(())
}
