//! Period-over-period changes.

use crate::aggregate::{AggregationResult, GroupValue};
use serde::Serialize;

const ZERO_TOLERANCE: f64 = 1e-10;

/// Percentage change from `previous` to `current`.
///
/// Returns `0.0` when `previous` is zero, since no meaningful percentage exists.
pub fn percent_change(previous: f64, current: f64) -> f64 {
    if previous.abs() < ZERO_TOLERANCE {
        0.0
    } else {
        (current - previous) / previous * 100.0
    }
}

/// Change of one period against the one before it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodChange {
    /// The later period.
    pub period: GroupValue,
    /// Value in the earlier period.
    pub previous: f64,
    /// Value in the later period.
    pub current: f64,
    /// `current - previous`
    pub absolute: f64,
    /// Percentage change, zero when `previous` is zero.
    pub percent: f64,
}

/// Consecutive changes of a result keyed by a single period column.
///
/// Rows are compared in result order, which is chronological for period keys.
/// Results with more than one group column yield no changes.
pub fn period_changes(result: &AggregationResult) -> Vec<PeriodChange> {
    if result.group_columns.len() != 1 {
        return Vec::new();
    }
    result
        .rows
        .windows(2)
        .map(|pair| {
            let (before, after) = (&pair[0], &pair[1]);
            PeriodChange {
                period: after.keys[0].clone(),
                previous: before.value,
                current: after.value,
                absolute: after.value - before.value,
                percent: percent_change(before.value, after.value),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::ValueColumn;
    use crate::aggregation::{Aggregation, PeriodTotals};
    use crate::fixtures::portfolio;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case(100.0, 110.0, 10.0)]
    #[case(200.0, 150.0, -25.0)]
    #[case(0.0, 50.0, 0.0)]
    #[case(1e-12, 50.0, 0.0)]
    #[case(-50.0, -25.0, -50.0)]
    fn test_percent_change(#[case] previous: f64, #[case] current: f64, #[case] expected: f64) {
        assert_relative_eq!(percent_change(previous, current), expected, epsilon = 1e-9);
    }

    #[test]
    fn test_period_changes() {
        let names = vec!["Jenis".to_string(), "Generasi".to_string()];
        let totals = PeriodTotals::new("totals", &names, ValueColumn::Value).aggregate(&portfolio());
        let changes = period_changes(&totals);
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].period.to_string(), "Des 2023");
        assert_relative_eq!(changes[0].absolute, 35.0);
        assert_relative_eq!(changes[0].percent, 35.0 / 150.0 * 100.0);
        assert_eq!(changes[1].period.to_string(), "Jan 2024");
        assert_relative_eq!(changes[1].previous, 185.0);
    }

    #[test]
    fn test_multi_key_result_has_no_changes() {
        let result = AggregationResult {
            group_columns: vec!["period".into(), "Jenis".into()],
            value_column: "Value".into(),
            rows: Vec::new(),
        };
        assert!(period_changes(&result).is_empty());
    }
}
