#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod aggregate;
pub mod aggregation;
pub mod delta;
pub mod filter;
pub mod views;

#[cfg(test)]
mod fixtures;

pub use aggregate::{
    AggregateRow, AggregationResult, GroupKey, GroupValue, PERIOD_GROUP_COLUMN, Scale,
    ScaleParseError, TieBreak, ValueColumn, last_by, sum_by,
};
pub use aggregation::{Aggregation, LastBy, PeriodTotals, SumBy};
pub use delta::{PeriodChange, percent_change, period_changes};
pub use filter::{DateRange, FilterEngine, FilterSpec};
pub use views::{
    ViewInfo, ViewKind, available_views, build_view, get_view_info, list_view_names, view_map,
};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
