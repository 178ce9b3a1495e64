//! Conversion to polars `DataFrame`s for charting front ends.

use chrono::Datelike;
use outstanding_analytics::{AggregationResult, GroupValue};
use outstanding_normalize::{AUDITED_COLUMN, Dataset, PERIOD_KEY_COLUMN, PERIOD_LABEL_COLUMN};
use polars::prelude::*;

/// Days from 0001-01-01 to 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// The normalized table as a `DataFrame`.
///
/// The period column becomes a `Date`, amounts `Float64`, the period key `Int32`
/// and every other raw column a nullable string.
pub fn dataset_frame(dataset: &Dataset) -> PolarsResult<DataFrame> {
    let schema = dataset.schema();
    let mut columns: Vec<Column> = Vec::with_capacity(dataset.columns().len());

    for name in dataset.raw_columns() {
        let series = if *name == schema.period {
            let days: Vec<i32> = dataset
                .iter()
                .map(|r| r.date().num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE)
                .collect();
            Series::new(name.as_str().into(), days).cast(&DataType::Date)?
        } else if *name == schema.value {
            let values: Vec<f64> = dataset.iter().map(|r| r.value()).collect();
            Series::new(name.as_str().into(), values)
        } else if schema.debtors.as_ref() == Some(name) {
            let debtors: Vec<Option<f64>> = dataset.iter().map(|r| r.debtors()).collect();
            Series::new(name.as_str().into(), debtors)
        } else {
            let text: Vec<Option<String>> = dataset
                .iter()
                .map(|r| {
                    r.get(name)
                        .filter(|cell| !cell.is_empty())
                        .map(ToString::to_string)
                })
                .collect();
            Series::new(name.as_str().into(), text)
        };
        columns.push(series.into());
    }

    let keys: Vec<i32> = dataset.iter().map(|r| r.period_key()).collect();
    let labels: Vec<String> = dataset.iter().map(|r| r.period_label().to_string()).collect();
    let audited: Vec<bool> = dataset.iter().map(|r| r.is_audited()).collect();
    columns.push(Series::new(PERIOD_KEY_COLUMN.into(), keys).into());
    columns.push(Series::new(PERIOD_LABEL_COLUMN.into(), labels).into());
    columns.push(Series::new(AUDITED_COLUMN.into(), audited).into());

    DataFrame::new(columns)
}

/// An aggregation result as a `DataFrame`.
///
/// Period group columns become two columns, `<name>_key` (`Int32`) and
/// `<name>` (label), so charts can sort chronologically.
pub fn aggregation_frame(result: &AggregationResult) -> PolarsResult<DataFrame> {
    let mut columns: Vec<Column> = Vec::new();

    for (i, name) in result.group_columns.iter().enumerate() {
        let is_period = result
            .rows
            .first()
            .is_some_and(|row| matches!(row.keys[i], GroupValue::Period { .. }));
        if is_period {
            let keys: Vec<i32> = result
                .rows
                .iter()
                .map(|row| match &row.keys[i] {
                    GroupValue::Period { key, .. } => *key,
                    GroupValue::Text(_) => 0,
                })
                .collect();
            columns.push(Series::new(format!("{name}_key").into(), keys).into());
        }
        let labels: Vec<String> = result.rows.iter().map(|row| row.keys[i].to_string()).collect();
        columns.push(Series::new(name.as_str().into(), labels).into());
    }

    let values: Vec<f64> = result.rows.iter().map(|row| row.value).collect();
    columns.push(Series::new(result.value_column.as_str().into(), values).into());

    DataFrame::new(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use outstanding_analytics::{GroupKey, ValueColumn, sum_by};
    use outstanding_data::{CsvOptions, load_csv};
    use outstanding_normalize::{ColumnSchema, NormalizationPolicy, TableNormalizer};

    fn dataset() -> Dataset {
        let upload = "Periode,Jenis,Generasi,Value,Jumlah Debitur\n\
                      Jan 2024,KUR,1,\"1.000\",10\n\
                      Feb 2024,KUR,1,\"2.000\",\n\
                      Feb 2024,PEN,2,\"500\",3\n";
        let raw = load_csv(upload.as_bytes(), "t.csv", CsvOptions::default()).unwrap();
        TableNormalizer::new(&NormalizationPolicy::default(), ColumnSchema::default())
            .unwrap()
            .normalize_table(&raw)
            .unwrap()
            .dataset
    }

    #[test]
    fn test_dataset_frame() {
        let df = dataset_frame(&dataset()).unwrap();
        assert_eq!(df.shape(), (3, 8));
        assert_eq!(df.column("Periode").unwrap().dtype(), &DataType::Date);
        assert_eq!(df.column("Value").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("Jumlah Debitur").unwrap().null_count(), 1);

        // 2024-02-01 is day 19754 of the Unix epoch.
        let days = df.column("Periode").unwrap().cast(&DataType::Int32).unwrap();
        assert_eq!(days.i32().unwrap().get(1), Some(19754));
        let feb = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        assert_eq!(feb.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE, 19754);
    }

    #[test]
    fn test_aggregation_frame_with_period() {
        let result = sum_by(
            &dataset(),
            &[GroupKey::Period, GroupKey::category("Jenis")],
            ValueColumn::Value,
        );
        let df = aggregation_frame(&result).unwrap();
        let names: Vec<&str> = df.get_column_names().into_iter().map(|s| s.as_str()).collect();
        assert_eq!(names, vec!["period_key", "period", "Jenis", "Value"]);
        assert_eq!(df.height(), 3);

        let values = df.column("Value").unwrap().f64().unwrap();
        assert_eq!(values.get(1), Some(2000.0));
    }
}
