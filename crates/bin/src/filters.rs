//! Turning `--select`, `--select-none`, `--from` and `--to` into a [`FilterSpec`].

use chrono::NaiveDate;
use clap::Args;
use outstanding::analytics::{DateRange, FilterSpec};
use outstanding::normalize::Period;
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors in filter arguments.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum FilterArgError {
    #[error("Expected COLUMN=VALUE, got '{0}'")]
    Selection(String),

    #[error("Expected a date (YYYY-MM-DD) or month (YYYY-MM), got '{0}'")]
    Date(String),
}

/// Filter flags shared by `summary` and `export`.
#[derive(Debug, Clone, Default, Args)]
pub(crate) struct FilterArgs {
    /// Keep only rows whose COLUMN equals VALUE (repeatable; values of one column are OR-ed)
    #[arg(long = "select", value_name = "COLUMN=VALUE")]
    pub(crate) select: Vec<String>,

    /// Deselect every value of COLUMN
    #[arg(long = "select-none", value_name = "COLUMN")]
    pub(crate) select_none: Vec<String>,

    /// First included day (YYYY-MM-DD) or month (YYYY-MM)
    #[arg(long)]
    pub(crate) from: Option<String>,

    /// Last included day (YYYY-MM-DD) or month (YYYY-MM)
    #[arg(long)]
    pub(crate) to: Option<String>,
}

#[derive(Debug, Clone, Copy)]
enum Bound {
    Start,
    End,
}

fn parse_bound(raw: &str, bound: Bound) -> Result<NaiveDate, FilterArgError> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    let period = raw
        .split_once('-')
        .and_then(|(y, m)| Some((y.parse::<i32>().ok()?, m.parse::<u32>().ok()?)))
        .and_then(|(y, m)| Period::new(y, m))
        .ok_or_else(|| FilterArgError::Date(raw.to_string()))?;
    Ok(match bound {
        Bound::Start => period.first_day(),
        Bound::End => period.last_day(),
    })
}

impl FilterArgs {
    /// Narrow `base` (normally the widest spec of the upload) by the flags.
    pub(crate) fn apply(&self, base: FilterSpec) -> Result<FilterSpec, FilterArgError> {
        let mut selections: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for item in &self.select {
            let (column, value) = item
                .split_once('=')
                .filter(|(column, _)| !column.trim().is_empty())
                .ok_or_else(|| FilterArgError::Selection(item.clone()))?;
            selections.entry(column.trim()).or_default().push(value.trim());
        }

        let mut spec = base;
        for (column, values) in selections {
            spec = spec.select(column, values);
        }
        for column in &self.select_none {
            spec = spec.select_none(column);
        }

        let mut range = spec.range;
        if let Some(from) = &self.from {
            range.start = parse_bound(from, Bound::Start)?;
        }
        if let Some(to) = &self.to {
            range.end = parse_bound(to, Bound::End)?;
        }
        Ok(spec.with_range(DateRange::new(range.start, range.end)))
    }
}
