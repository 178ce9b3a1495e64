//! Grouped aggregation primitives.
//!
//! Results are ordered by their group keys: periods chronologically (by period
//! key), text alphabetically. Records lacking a category value for a grouping
//! column are left out of that aggregation.

use outstanding_normalize::{ColumnSchema, Dataset, NormalizedRecord};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Column name used for period groups.
pub const PERIOD_GROUP_COLUMN: &str = "period";

/// What to group records by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    /// A categorical column, e.g. `Jenis`.
    Category(String),
    /// The reporting period.
    Period,
}

impl GroupKey {
    /// Group by the categorical column `column`.
    pub fn category(column: &str) -> Self {
        Self::Category(column.to_string())
    }

    /// Column name of this key in an [`AggregationResult`].
    pub fn column_name(&self) -> &str {
        match self {
            Self::Category(column) => column,
            Self::Period => PERIOD_GROUP_COLUMN,
        }
    }

    fn extract(&self, record: &NormalizedRecord) -> Option<GroupValue> {
        match self {
            Self::Category(column) => record.category(column).map(GroupValue::Text),
            Self::Period => Some(GroupValue::Period {
                key: record.period_key(),
                label: record.period_label().to_string(),
            }),
        }
    }
}

/// One group key value.
///
/// Periods order by key, so a result grouped by period is chronological.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum GroupValue {
    /// A reporting period.
    Period {
        /// `year * 100 + month`
        key: i32,
        /// Display label
        label: String,
    },
    /// A category value.
    Text(String),
}

impl fmt::Display for GroupValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Period { label, .. } => f.write_str(label),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// Numeric column to aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueColumn {
    /// Outstanding amount.
    Value,
    /// Debtor count; missing counts contribute nothing.
    Debtors,
}

impl ValueColumn {
    /// Column name under `schema`.
    pub fn name(&self, schema: &ColumnSchema) -> String {
        match self {
            Self::Value => schema.value.clone(),
            Self::Debtors => schema
                .debtors
                .clone()
                .unwrap_or_else(|| "debtors".to_string()),
        }
    }

    /// The value of this column in `record`.
    pub const fn extract(&self, record: &NormalizedRecord) -> Option<f64> {
        match self {
            Self::Value => Some(record.value()),
            Self::Debtors => record.debtors(),
        }
    }
}

/// Tie-break applied when several records share a group's latest period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Audited records sort after unaudited ones and therefore win.
    #[default]
    Audited,
    /// Upload order only: the later row wins.
    None,
}

impl TieBreak {
    const fn rank(&self, record: &NormalizedRecord) -> u8 {
        match self {
            Self::Audited => record.is_audited() as u8,
            Self::None => 0,
        }
    }
}

/// One row of an aggregation result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    /// Group key values, aligned with [`AggregationResult::group_columns`].
    pub keys: Vec<GroupValue>,
    /// Aggregated value.
    pub value: f64,
}

/// A grouped table of one aggregated numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationResult {
    /// Names of the group columns.
    pub group_columns: Vec<String>,
    /// Name of the aggregated column.
    pub value_column: String,
    /// Rows in group key order.
    pub rows: Vec<AggregateRow>,
}

impl AggregationResult {
    /// Number of groups.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether there are no groups.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sum of all group values.
    pub fn total(&self) -> f64 {
        self.rows.iter().map(|row| row.value).sum()
    }

    /// Value of the group whose keys render as `keys`.
    pub fn get(&self, keys: &[&str]) -> Option<f64> {
        self.rows
            .iter()
            .find(|row| {
                row.keys.len() == keys.len()
                    && row.keys.iter().zip(keys).all(|(k, q)| k.to_string() == *q)
            })
            .map(|row| row.value)
    }

    /// A copy with every value divided by the scale's divisor.
    pub fn scaled(&self, scale: Scale) -> Self {
        let divisor = scale.divisor();
        Self {
            group_columns: self.group_columns.clone(),
            value_column: self.value_column.clone(),
            rows: self
                .rows
                .iter()
                .map(|row| AggregateRow {
                    keys: row.keys.clone(),
                    value: row.value / divisor,
                })
                .collect(),
        }
    }

    fn from_groups(
        group_keys: &[GroupKey],
        value_column: String,
        groups: BTreeMap<Vec<GroupValue>, f64>,
    ) -> Self {
        Self {
            group_columns: group_keys
                .iter()
                .map(|key| key.column_name().to_string())
                .collect(),
            value_column,
            rows: groups
                .into_iter()
                .map(|(keys, value)| AggregateRow { keys, value })
                .collect(),
        }
    }
}

/// Divisor applied to amounts for display.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scale {
    /// No scaling.
    #[default]
    Unit,
    /// 1e9 (miliar).
    Billion,
    /// 1e12 (triliun).
    Trillion,
    /// 1e15.
    Quadrillion,
    /// Any positive divisor.
    Custom(f64),
}

impl Scale {
    /// The divisor. A non-positive or non-finite custom divisor falls back to 1.
    pub fn divisor(&self) -> f64 {
        match self {
            Self::Unit => 1.0,
            Self::Billion => 1e9,
            Self::Trillion => 1e12,
            Self::Quadrillion => 1e15,
            Self::Custom(d) if d.is_finite() && *d > 0.0 => *d,
            Self::Custom(_) => 1.0,
        }
    }

    /// Apply the scale to a single amount.
    pub fn apply(&self, value: f64) -> f64 {
        value / self.divisor()
    }
}

/// Error returned when a scale name cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown scale '{0}' (expected unit, billion, trillion, quadrillion or a positive number)")]
pub struct ScaleParseError(String);

impl std::str::FromStr for Scale {
    type Err = ScaleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unit" | "1" => Ok(Self::Unit),
            "billion" | "miliar" | "1e9" => Ok(Self::Billion),
            "trillion" | "triliun" | "1e12" => Ok(Self::Trillion),
            "quadrillion" | "1e15" => Ok(Self::Quadrillion),
            other => other
                .parse::<f64>()
                .ok()
                .filter(|d| d.is_finite() && *d > 0.0)
                .map(Self::Custom)
                .ok_or_else(|| ScaleParseError(s.to_string())),
        }
    }
}

fn group_of(group_keys: &[GroupKey], record: &NormalizedRecord) -> Option<Vec<GroupValue>> {
    group_keys.iter().map(|key| key.extract(record)).collect()
}

/// Sum `value` per group.
pub fn sum_by(dataset: &Dataset, group_keys: &[GroupKey], value: ValueColumn) -> AggregationResult {
    let mut groups: BTreeMap<Vec<GroupValue>, f64> = BTreeMap::new();
    for record in dataset {
        let Some(group) = group_of(group_keys, record) else {
            continue;
        };
        *groups.entry(group).or_insert(0.0) += value.extract(record).unwrap_or(0.0);
    }
    AggregationResult::from_groups(group_keys, value.name(dataset.schema()), groups)
}

/// The value of the last record per group after ordering by
/// `(period_key, tie_break)`; later upload rows win remaining ties.
///
/// With [`TieBreak::Audited`] an audited figure supersedes an unaudited one for
/// the same period. Records without a value in `value` are ignored.
pub fn last_by(
    dataset: &Dataset,
    group_keys: &[GroupKey],
    value: ValueColumn,
    tie_break: TieBreak,
) -> AggregationResult {
    let mut latest: BTreeMap<Vec<GroupValue>, ((i32, u8, usize), f64)> = BTreeMap::new();
    for (index, record) in dataset.iter().enumerate() {
        let (Some(group), Some(amount)) = (group_of(group_keys, record), value.extract(record))
        else {
            continue;
        };
        let rank = (record.period_key(), tie_break.rank(record), index);
        latest
            .entry(group)
            .and_modify(|current| {
                if rank > current.0 {
                    *current = (rank, amount);
                }
            })
            .or_insert((rank, amount));
    }
    let groups = latest
        .into_iter()
        .map(|(group, (_, amount))| (group, amount))
        .collect();
    AggregationResult::from_groups(group_keys, value.name(dataset.schema()), groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{dataset, portfolio};
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[test]
    fn test_sum_by_category() {
        let result = sum_by(&portfolio(), &[GroupKey::category("Jenis")], ValueColumn::Value);
        assert_eq!(result.group_columns, vec!["Jenis"]);
        assert_eq!(result.value_column, "Value");
        assert_eq!(result.len(), 2);
        assert_eq!(result.get(&["KUR"]), Some(475.0));
        assert_eq!(result.get(&["PEN"]), Some(180.0));
        assert_relative_eq!(result.total(), 655.0);
    }

    #[test]
    fn test_sum_by_period_is_chronological() {
        let data = dataset(&[
            ["2024-01-31", "KUR", "1", "3", "1"],
            ["2023-12-31", "KUR", "1", "2", "1"],
            ["2023-02-28", "KUR", "1", "1", "1"],
        ]);
        let result = sum_by(&data, &[GroupKey::Period], ValueColumn::Value);
        let labels: Vec<String> = result.rows.iter().map(|r| r.keys[0].to_string()).collect();
        assert_eq!(labels, vec!["Feb 2023", "Des 2023", "Jan 2024"]);
    }

    #[test]
    fn test_sum_debtors_skips_missing() {
        let result = sum_by(&portfolio(), &[GroupKey::category("Jenis")], ValueColumn::Debtors);
        assert_eq!(result.value_column, "Jumlah Debitur");
        assert_eq!(result.get(&["PEN"]), Some(11.0));
        assert_eq!(result.get(&["KUR"]), Some(44.0));
    }

    #[test]
    fn test_last_by_prefers_audited() {
        let data = dataset(&[
            ["Des 2023 (Audited)", "KUR", "1", "100", "1"],
            ["2023-12-31", "KUR", "1", "90", "1"],
        ]);
        let result = last_by(&data, &[GroupKey::Period], ValueColumn::Value, TieBreak::Audited);
        assert_eq!(result.get(&["Des 2023"]), Some(100.0));

        let result = last_by(&data, &[GroupKey::Period], ValueColumn::Value, TieBreak::None);
        assert_eq!(result.get(&["Des 2023"]), Some(90.0));
    }

    #[test]
    fn test_last_by_takes_latest_period_per_category() {
        let result = last_by(
            &portfolio(),
            &[GroupKey::category("Jenis")],
            ValueColumn::Value,
            TieBreak::Audited,
        );
        assert_eq!(result.get(&["KUR"]), Some(130.0));
        assert_eq!(result.get(&["PEN"]), Some(70.0));
    }

    #[test]
    fn test_last_by_period_and_category() {
        let result = last_by(
            &portfolio(),
            &[GroupKey::Period, GroupKey::category("Jenis")],
            ValueColumn::Value,
            TieBreak::Audited,
        );
        assert_eq!(result.get(&["Des 2023", "KUR"]), Some(125.0));
        assert_eq!(result.get(&["Des 2023", "PEN"]), Some(60.0));
        assert_eq!(result.len(), 6);
    }

    #[test]
    fn test_blank_category_row_never_reaches_groups() {
        let data = dataset(&[
            ["2024-01-31", "KUR", "1", "10", "1"],
            ["2024-01-31", "", "1", "20", "1"],
        ]);
        assert_eq!(data.len(), 1);
        let result = sum_by(&data, &[GroupKey::category("Jenis")], ValueColumn::Value);
        assert_eq!(result.len(), 1);
        assert_relative_eq!(result.total(), 10.0);
    }

    #[rstest]
    #[case(Scale::Unit, 2.5e15)]
    #[case(Scale::Billion, 2.5e6)]
    #[case(Scale::Trillion, 2.5e3)]
    #[case(Scale::Quadrillion, 2.5)]
    #[case(Scale::Custom(1e6), 2.5e9)]
    #[case(Scale::Custom(0.0), 2.5e15)]
    fn test_scale(#[case] scale: Scale, #[case] expected: f64) {
        assert_relative_eq!(scale.apply(2.5e15), expected, max_relative = 1e-12);
    }

    #[test]
    fn test_scaled_result() {
        let result = sum_by(&portfolio(), &[GroupKey::category("Jenis")], ValueColumn::Value)
            .scaled(Scale::Custom(10.0));
        assert_eq!(result.get(&["KUR"]), Some(47.5));
    }

    #[rstest]
    #[case("billion", Scale::Billion)]
    #[case("Triliun", Scale::Trillion)]
    #[case("quadrillion", Scale::Quadrillion)]
    #[case("1000", Scale::Custom(1000.0))]
    fn test_parse_scale(#[case] raw: &str, #[case] expected: Scale) {
        assert_eq!(raw.parse::<Scale>().unwrap(), expected);
    }

    #[test]
    fn test_parse_scale_rejects_garbage() {
        assert!("lots".parse::<Scale>().is_err());
        assert!("-5".parse::<Scale>().is_err());
    }
}
