//! Demonstration of the view registry over a small in-memory upload.

use outstanding_analytics::{FilterEngine, FilterSpec, available_views, build_view};
use outstanding_data::{CsvOptions, load_csv};
use outstanding_normalize::{ColumnSchema, NormalizationPolicy, TableNormalizer};

const UPLOAD: &str = "\
Periode,Jenis,Generasi,Value,Jumlah Debitur
Nov 2023,KUR,1,\"1.250.000.000.000\",1200
Nov 2023,PEN,1,\"300.000.000.000\",80
Des 2023,KUR,1,\"1.300.000.000.000\",1210
Des 2023 (Audited),KUR,1,\"1.320.000.000.000\",1210
Des 2023,PEN,2,\"310.000.000.000\",82
";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Outstanding View Registry Demo ===\n");

    let raw = load_csv(UPLOAD.as_bytes(), "demo.csv", CsvOptions::default())?;
    let schema = ColumnSchema::default();
    let normalizer = TableNormalizer::new(&NormalizationPolicy::default(), schema.clone())?;
    let normalized = normalizer.normalize(&raw, &["Periode", "Value"])?;
    println!(
        "Normalized {} of {} rows\n",
        normalized.report.kept_count(),
        normalized.report.total_rows
    );

    let dataset = normalized.dataset;
    let filtered = FilterEngine::apply(&dataset, &FilterSpec::select_all(&dataset));

    for info in available_views() {
        let Some(view) = build_view(info.name, &schema) else {
            continue;
        };
        let result = view.aggregate(&filtered).scaled(info.default_scale);
        println!("{} - {}", info.name, info.description);
        for row in &result.rows {
            let keys: Vec<String> = row.keys.iter().map(ToString::to_string).collect();
            println!("  {:<24} {:>12.3}", keys.join(" / "), row.value);
        }
        println!();
    }

    Ok(())
}
