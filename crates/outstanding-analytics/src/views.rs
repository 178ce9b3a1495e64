//! View registry
//!
//! The standard dashboard views, looked up by name and instantiated against a
//! [`ColumnSchema`]. Category views group by the schema's first categorical
//! column (`Jenis` by default).

use crate::aggregate::{GroupKey, Scale, TieBreak, ValueColumn};
use crate::aggregation::{Aggregation, LastBy, PeriodTotals, SumBy};
use outstanding_normalize::ColumnSchema;
use std::collections::HashMap;

/// How a view reduces its groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    /// Grouped sum
    Sum,
    /// Latest value per group
    Latest,
    /// Latest value per category, summed per period
    PeriodTotal,
}

/// View metadata
#[derive(Debug, Clone)]
pub struct ViewInfo {
    /// View name (unique identifier)
    pub name: &'static str,
    /// Reduction kind
    pub kind: ViewKind,
    /// Brief description of what the view shows
    pub description: &'static str,
    /// Aggregated column
    pub value: ValueColumn,
    /// Scale the dashboard displays the view in
    pub default_scale: Scale,
}

/// All registered views.
pub fn available_views() -> Vec<ViewInfo> {
    vec![
        ViewInfo {
            name: "portfolio_summary",
            kind: ViewKind::Sum,
            description: "Total outstanding per product type",
            value: ValueColumn::Value,
            default_scale: Scale::Trillion,
        },
        ViewInfo {
            name: "debtor_summary",
            kind: ViewKind::Sum,
            description: "Total debtor count per product type",
            value: ValueColumn::Debtors,
            default_scale: Scale::Unit,
        },
        ViewInfo {
            name: "outstanding_trend",
            kind: ViewKind::Sum,
            description: "Outstanding per period and product type",
            value: ValueColumn::Value,
            default_scale: Scale::Trillion,
        },
        ViewInfo {
            name: "latest_outstanding",
            kind: ViewKind::Latest,
            description: "Most recent outstanding per product type, audited figures first",
            value: ValueColumn::Value,
            default_scale: Scale::Trillion,
        },
        ViewInfo {
            name: "period_totals",
            kind: ViewKind::PeriodTotal,
            description: "Outstanding per period without double counting restatements",
            value: ValueColumn::Value,
            default_scale: Scale::Trillion,
        },
    ]
}

/// Get view info by name
pub fn get_view_info(name: &str) -> Option<ViewInfo> {
    available_views().into_iter().find(|v| v.name == name)
}

/// Get a map of all views indexed by name
pub fn view_map() -> HashMap<&'static str, ViewInfo> {
    available_views().into_iter().map(|v| (v.name, v)).collect()
}

/// List all view names
pub fn list_view_names() -> Vec<&'static str> {
    available_views().into_iter().map(|v| v.name).collect()
}

/// Instantiate the view `name` for `schema`.
///
/// Returns `None` for an unknown name, or for a debtor view when the schema has
/// no debtor column.
pub fn build_view(name: &str, schema: &ColumnSchema) -> Option<Box<dyn Aggregation>> {
    let info = get_view_info(name)?;
    if info.value == ValueColumn::Debtors && schema.debtors.is_none() {
        return None;
    }
    let category: Vec<GroupKey> = schema
        .categories
        .first()
        .map(|c| GroupKey::category(c))
        .into_iter()
        .collect();

    let view: Box<dyn Aggregation> = match (info.name, info.kind) {
        ("outstanding_trend", _) => {
            let keys = std::iter::once(GroupKey::Period).chain(category).collect();
            Box::new(SumBy::new(info.name, keys, info.value))
        }
        (_, ViewKind::Sum) => Box::new(SumBy::new(info.name, category, info.value)),
        (_, ViewKind::Latest) => Box::new(LastBy::new(
            info.name,
            category,
            info.value,
            TieBreak::Audited,
        )),
        (_, ViewKind::PeriodTotal) => {
            Box::new(PeriodTotals::new(info.name, &schema.categories, info.value))
        }
    };
    Some(view)
}
