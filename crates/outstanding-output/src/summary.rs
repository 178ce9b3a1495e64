//! Headline KPIs of a filtered dataset.

use outstanding_analytics::{Aggregation, PeriodTotals, Scale, ValueColumn, percent_change};
use outstanding_normalize::Dataset;
use serde::Serialize;
use std::fmt;

/// Headline figures shown above the dashboard charts.
///
/// Totals sum every record as uploaded. The latest-period figures use
/// [`PeriodTotals`], so an audited restatement replaces the unaudited figure
/// instead of being added to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSummary {
    /// Number of records.
    pub record_count: usize,

    /// Sum of all outstanding amounts.
    pub total_outstanding: f64,

    /// Sum of debtor counts, when the upload has a debtor column.
    pub total_debtors: Option<f64>,

    /// Label of the most recent period.
    pub latest_period: Option<String>,

    /// Outstanding in the most recent period.
    pub latest_outstanding: Option<f64>,

    /// Percentage change of the most recent period against the one before it.
    pub change_pct: Option<f64>,

    /// Scale applied to the monetary figures.
    pub scale: Scale,
}

impl KpiSummary {
    /// Compute the KPIs of `dataset`, with monetary figures divided by `scale`.
    pub fn from_dataset(dataset: &Dataset, scale: Scale) -> Self {
        let schema = dataset.schema();
        let total_outstanding: f64 = dataset.iter().map(|r| r.value()).sum();
        let total_debtors = schema
            .debtors
            .as_ref()
            .map(|_| dataset.iter().filter_map(|r| r.debtors()).sum::<f64>());

        let totals = PeriodTotals::new("kpi", &schema.categories, ValueColumn::Value)
            .aggregate(dataset);
        let latest = totals.rows.last();
        let previous = totals.rows.len().checked_sub(2).map(|i| &totals.rows[i]);

        Self {
            record_count: dataset.len(),
            total_outstanding: scale.apply(total_outstanding),
            total_debtors,
            latest_period: latest.map(|row| row.keys[0].to_string()),
            latest_outstanding: latest.map(|row| scale.apply(row.value)),
            change_pct: latest
                .zip(previous)
                .map(|(now, before)| percent_change(before.value, now.value)),
            scale,
        }
    }

    /// Whether the summary describes no records.
    pub const fn is_empty(&self) -> bool {
        self.record_count == 0
    }
}

impl fmt::Display for KpiSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match self.scale {
            Scale::Unit => String::new(),
            Scale::Billion => " (miliar)".to_string(),
            Scale::Trillion => " (triliun)".to_string(),
            Scale::Quadrillion => " (x 1e15)".to_string(),
            Scale::Custom(d) => format!(" (x {d})"),
        };
        let decimals = if self.scale == Scale::Unit { 0 } else { 2 };

        writeln!(
            f,
            "Total Outstanding{unit}: {}",
            group_thousands(self.total_outstanding, decimals)
        )?;
        if let Some(debtors) = self.total_debtors {
            writeln!(f, "Jumlah Debitur: {}", group_thousands(debtors, 0))?;
        }
        writeln!(f, "Jumlah Data: {}", self.record_count)?;
        if let (Some(period), Some(value)) = (&self.latest_period, self.latest_outstanding) {
            write!(
                f,
                "Outstanding {period}{unit}: {}",
                group_thousands(value, decimals)
            )?;
            if let Some(pct) = self.change_pct {
                write!(f, " ({pct:+.2}%)")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Format `value` with `decimals` fraction digits and `,` between thousands.
pub fn group_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3 + 4);
    if value < 0.0 && formatted.chars().any(|c| c != '0' && c != '.') {
        grouped.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use outstanding_data::{CsvOptions, load_csv};
    use outstanding_normalize::{ColumnSchema, NormalizationPolicy, TableNormalizer};
    use rstest::rstest;

    fn dataset() -> Dataset {
        let upload = "Periode,Jenis,Generasi,Value,Jumlah Debitur\n\
                      Nov 2023,KUR,1,\"1.000.000\",10\n\
                      Des 2023,KUR,1,\"1.100.000\",11\n\
                      Des 2023 (Audited),KUR,1,\"1.200.000\",11\n\
                      Des 2023,PEN,1,\"300.000\",\n";
        let raw = load_csv(upload.as_bytes(), "t.csv", CsvOptions::default()).unwrap();
        TableNormalizer::new(&NormalizationPolicy::default(), ColumnSchema::default())
            .unwrap()
            .normalize_table(&raw)
            .unwrap()
            .dataset
    }

    #[test]
    fn test_kpis() {
        let kpi = KpiSummary::from_dataset(&dataset(), Scale::Unit);
        assert_eq!(kpi.record_count, 4);
        assert_relative_eq!(kpi.total_outstanding, 3_600_000.0);
        assert_eq!(kpi.total_debtors, Some(32.0));
        assert_eq!(kpi.latest_period.as_deref(), Some("Des 2023"));
        assert_eq!(kpi.latest_outstanding, Some(1_500_000.0));
        assert_relative_eq!(kpi.change_pct.unwrap(), 50.0);
    }

    #[test]
    fn test_scaled_kpis() {
        let kpi = KpiSummary::from_dataset(&dataset(), Scale::Custom(1e6));
        assert_relative_eq!(kpi.total_outstanding, 3.6);
        assert_eq!(kpi.total_debtors, Some(32.0));
    }

    #[test]
    fn test_empty_dataset() {
        let empty = dataset().with_records(Vec::new());
        let kpi = KpiSummary::from_dataset(&empty, Scale::Unit);
        assert!(kpi.is_empty());
        assert_eq!(kpi.latest_period, None);
        assert_eq!(kpi.change_pct, None);
        assert_eq!(kpi.total_debtors, Some(0.0));
    }

    #[test]
    fn test_display() {
        let text = KpiSummary::from_dataset(&dataset(), Scale::Unit).to_string();
        assert!(text.contains("Total Outstanding: 3,600,000"));
        assert!(text.contains("Jumlah Debitur: 32"));
        assert!(text.contains("Jumlah Data: 4"));
        assert!(text.contains("Outstanding Des 2023: 1,500,000 (+50.00%)"));
    }

    #[rstest]
    #[case(0.0, 0, "0")]
    #[case(999.0, 0, "999")]
    #[case(1000.0, 0, "1,000")]
    #[case(1234567.891, 2, "1,234,567.89")]
    #[case(-1234567.0, 0, "-1,234,567")]
    #[case(-0.001, 2, "0.00")]
    #[case(123456.0, 0, "123,456")]
    fn test_group_thousands(#[case] value: f64, #[case] decimals: usize, #[case] expected: &str) {
        assert_eq!(group_thousands(value, decimals), expected);
    }
}
