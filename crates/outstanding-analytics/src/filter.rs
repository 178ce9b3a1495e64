//! Category and date-range filtering.
//!
//! A [`FilterSpec`] is an explicit value built by the presentation layer from the
//! user's selections. [`FilterEngine::apply`] never modifies its input; it returns
//! a fresh [`Dataset`] so the original stays available for re-filtering.

use chrono::NaiveDate;
use outstanding_normalize::{Dataset, NormalizedRecord};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First included day.
    pub start: NaiveDate,
    /// Last included day.
    pub end: NaiveDate,
}

impl DateRange {
    /// Create a range from `start` to `end`, both inclusive.
    pub const fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// A range that admits every date.
    pub const fn unbounded() -> Self {
        Self {
            start: NaiveDate::MIN,
            end: NaiveDate::MAX,
        }
    }

    /// Whether `date` lies within the range. A reversed range admits nothing.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl Default for DateRange {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// Selected category values per column plus a date range.
///
/// Columns absent from `categories` are not filtered. A column present with an
/// empty selection admits no record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Selected values per categorical column.
    pub categories: BTreeMap<String, BTreeSet<String>>,
    /// Inclusive date range.
    pub range: DateRange,
}

impl FilterSpec {
    /// The widest spec for `dataset`: every category value and its full date range.
    pub fn select_all(dataset: &Dataset) -> Self {
        let categories = dataset
            .category_domains()
            .iter()
            .map(|(column, values)| (column.clone(), values.iter().cloned().collect()))
            .collect();
        let range = dataset
            .date_range()
            .map_or_else(DateRange::unbounded, |(start, end)| DateRange::new(start, end));
        Self { categories, range }
    }

    /// Restrict `column` to `values`.
    pub fn select<I, S>(mut self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories.insert(
            column.to_string(),
            values.into_iter().map(Into::into).collect(),
        );
        self
    }

    /// Deselect every value of `column`.
    pub fn select_none(mut self, column: &str) -> Self {
        self.categories.insert(column.to_string(), BTreeSet::new());
        self
    }

    /// Replace the date range.
    pub const fn with_range(mut self, range: DateRange) -> Self {
        self.range = range;
        self
    }

    /// Whether `record` passes every predicate.
    pub fn matches(&self, record: &NormalizedRecord) -> bool {
        self.range.contains(record.date())
            && self.categories.iter().all(|(column, selected)| {
                record
                    .category(column)
                    .is_some_and(|value| selected.contains(&value))
            })
    }
}

/// Applies a [`FilterSpec`] to a [`Dataset`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterEngine;

impl FilterEngine {
    /// Records of `dataset` passing `spec`, in upload order.
    ///
    /// An empty result is a valid outcome, distinct from an empty upload.
    pub fn apply(dataset: &Dataset, spec: &FilterSpec) -> Dataset {
        let records: Vec<NormalizedRecord> = dataset
            .iter()
            .filter(|record| spec.matches(record))
            .cloned()
            .collect();
        debug!(
            input = dataset.len(),
            retained = records.len(),
            "applied filter"
        );
        dataset.with_records(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::portfolio;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_select_all_keeps_everything() {
        let dataset = portfolio();
        let spec = FilterSpec::select_all(&dataset);
        let filtered = FilterEngine::apply(&dataset, &spec);
        assert_eq!(filtered, dataset);
    }

    #[test]
    fn test_category_selection() {
        let dataset = portfolio();
        let spec = FilterSpec::select_all(&dataset).select("Jenis", ["PEN"]);
        let filtered = FilterEngine::apply(&dataset, &spec);
        assert_eq!(filtered.len(), 3);
        assert!(filtered.iter().all(|r| r.category("Jenis").as_deref() == Some("PEN")));
        assert_eq!(filtered.category_domain("Jenis").unwrap(), ["PEN".to_string()]);
    }

    #[test]
    fn test_empty_selection_excludes_all() {
        let dataset = portfolio();
        let spec = FilterSpec::select_all(&dataset).select_none("Generasi");
        let filtered = FilterEngine::apply(&dataset, &spec);
        assert!(filtered.is_empty());
        assert_eq!(dataset.len(), 7);
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let dataset = portfolio();
        let spec = FilterSpec::default().with_range(DateRange::new(date(2023, 12, 1), date(2023, 12, 31)));
        let filtered = FilterEngine::apply(&dataset, &spec);
        assert_eq!(filtered.len(), 3);
        assert!(filtered.iter().all(|r| r.period_key() == 202312));
    }

    #[test]
    fn test_reversed_range_admits_nothing() {
        let range = DateRange::new(date(2024, 1, 31), date(2023, 1, 1));
        assert!(!range.contains(date(2023, 6, 1)));
        assert!(DateRange::unbounded().contains(date(1900, 1, 1)));
    }

    #[test]
    fn test_unknown_column_excludes_all() {
        let dataset = portfolio();
        let spec = FilterSpec::default().select("Wilayah", ["Jawa"]);
        assert!(FilterEngine::apply(&dataset, &spec).is_empty());
    }
}
