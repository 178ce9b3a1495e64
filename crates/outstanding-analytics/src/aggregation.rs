//! The [`Aggregation`] trait and its standard implementations.

use crate::aggregate::{
    AggregateRow, AggregationResult, GroupKey, GroupValue, TieBreak, ValueColumn, last_by, sum_by,
};
use outstanding_normalize::{ColumnSchema, Dataset};
use std::collections::BTreeMap;

/// A named reduction of a [`Dataset`] into an [`AggregationResult`].
pub trait Aggregation: std::fmt::Debug + Send + Sync {
    /// Stable identifier.
    fn name(&self) -> &str;

    /// Keys the result is grouped by.
    fn group_keys(&self) -> &[GroupKey];

    /// Raw columns the aggregation reads, under `schema`.
    fn required_columns(&self, schema: &ColumnSchema) -> Vec<String>;

    /// Run the aggregation.
    fn aggregate(&self, dataset: &Dataset) -> AggregationResult;
}

fn columns_for(keys: &[GroupKey], value: ValueColumn, schema: &ColumnSchema) -> Vec<String> {
    let mut columns: Vec<String> = keys
        .iter()
        .map(|key| match key {
            GroupKey::Category(column) => column.clone(),
            GroupKey::Period => schema.period.clone(),
        })
        .collect();
    columns.push(value.name(schema));
    columns
}

/// Grouped sum.
#[derive(Debug, Clone, PartialEq)]
pub struct SumBy {
    name: String,
    keys: Vec<GroupKey>,
    value: ValueColumn,
}

impl SumBy {
    /// Sum `value` per `keys`.
    pub fn new(name: impl Into<String>, keys: Vec<GroupKey>, value: ValueColumn) -> Self {
        Self { name: name.into(), keys, value }
    }
}

impl Aggregation for SumBy {
    fn name(&self) -> &str {
        &self.name
    }

    fn group_keys(&self) -> &[GroupKey] {
        &self.keys
    }

    fn required_columns(&self, schema: &ColumnSchema) -> Vec<String> {
        columns_for(&self.keys, self.value, schema)
    }

    fn aggregate(&self, dataset: &Dataset) -> AggregationResult {
        sum_by(dataset, &self.keys, self.value)
    }
}

/// Latest value per group.
#[derive(Debug, Clone, PartialEq)]
pub struct LastBy {
    name: String,
    keys: Vec<GroupKey>,
    value: ValueColumn,
    tie_break: TieBreak,
}

impl LastBy {
    /// Latest `value` per `keys`, resolving same-period ties with `tie_break`.
    pub fn new(
        name: impl Into<String>,
        keys: Vec<GroupKey>,
        value: ValueColumn,
        tie_break: TieBreak,
    ) -> Self {
        Self { name: name.into(), keys, value, tie_break }
    }
}

impl Aggregation for LastBy {
    fn name(&self) -> &str {
        &self.name
    }

    fn group_keys(&self) -> &[GroupKey] {
        &self.keys
    }

    fn required_columns(&self, schema: &ColumnSchema) -> Vec<String> {
        columns_for(&self.keys, self.value, schema)
    }

    fn aggregate(&self, dataset: &Dataset) -> AggregationResult {
        last_by(dataset, &self.keys, self.value, self.tie_break)
    }
}

/// Per-period total of the latest figure of every category combination.
///
/// Restated (audited) figures replace the unaudited ones before summing, so a
/// period is never double counted.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodTotals {
    name: String,
    keys: Vec<GroupKey>,
    value: ValueColumn,
}

impl PeriodTotals {
    /// Totals of `value` per period across the given category columns.
    pub fn new(name: impl Into<String>, categories: &[String], value: ValueColumn) -> Self {
        let keys = std::iter::once(GroupKey::Period)
            .chain(categories.iter().map(|c| GroupKey::category(c)))
            .collect();
        Self { name: name.into(), keys, value }
    }
}

impl Aggregation for PeriodTotals {
    fn name(&self) -> &str {
        &self.name
    }

    fn group_keys(&self) -> &[GroupKey] {
        &self.keys[..1]
    }

    fn required_columns(&self, schema: &ColumnSchema) -> Vec<String> {
        columns_for(&self.keys, self.value, schema)
    }

    fn aggregate(&self, dataset: &Dataset) -> AggregationResult {
        let latest = last_by(dataset, &self.keys, self.value, TieBreak::Audited);
        let mut totals: BTreeMap<GroupValue, f64> = BTreeMap::new();
        for row in latest.rows {
            if let Some(period) = row.keys.into_iter().next() {
                *totals.entry(period).or_insert(0.0) += row.value;
            }
        }
        AggregationResult {
            group_columns: latest.group_columns.into_iter().take(1).collect(),
            value_column: latest.value_column,
            rows: totals
                .into_iter()
                .map(|(period, value)| AggregateRow { keys: vec![period], value })
                .collect(),
        }
    }
}
