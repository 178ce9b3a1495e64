//! Reporting period parsing.
//!
//! A raw period is resolved in two stages, first success wins:
//!
//! 1. Hard date parsing (spreadsheet dates, ISO-8601, common numeric and English
//!    layouts). A full date always takes precedence over text matching.
//! 2. Free-text matching: the first month-table entry contained in the lower-cased
//!    text gives the month, then a year token is located per [`YearPattern`].
//!
//! Two-digit years are read as `20xx`. Results before the policy's `min_year` are
//! rejected.

use crate::error::PolicyError;
use crate::policy::{NormalizationPolicy, YearPattern};
use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveDateTime};
use outstanding_data::CellValue;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

const ISO_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

const DAY_FIRST_FORMATS: &[&str] = &["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];

const MONTH_FIRST_FORMATS: &[&str] = &["%m/%d/%Y", "%m-%d-%Y"];

const ENGLISH_DATE_FORMATS: &[&str] = &["%d %B %Y", "%B %d, %Y", "%B %d %Y"];

/// A calendar month.
///
/// Ordering is chronological, and [`Period::key`] (`year * 100 + month`) preserves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period(NaiveDate);

impl Period {
    /// Create a period; `None` when the month is outside 1-12 or the year is unrepresentable.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Self)
    }

    /// The period containing `date`.
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.with_day(1).unwrap_or(date))
    }

    /// Rebuild a period from its sort key.
    pub fn from_key(key: i32) -> Option<Self> {
        let month = u32::try_from(key.rem_euclid(100)).ok()?;
        Self::new(key.div_euclid(100), month)
    }

    /// Calendar year.
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Month, 1-12.
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Sortable integer key, `year * 100 + month`.
    pub fn key(&self) -> i32 {
        self.year() * 100 + self.month() as i32
    }

    /// First day of the month.
    pub const fn first_day(&self) -> NaiveDate {
        self.0
    }

    /// Last day of the month.
    pub fn last_day(&self) -> NaiveDate {
        self.0
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    /// The preceding month.
    pub fn previous(&self) -> Option<Self> {
        self.0.checked_sub_months(Months::new(1)).map(Self)
    }

    /// Display label such as `"Mei 2023"`, using the given month abbreviations.
    pub fn label(&self, labels: &[String; 12]) -> String {
        format!("{} {:04}", labels[self.month() as usize - 1], self.year())
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

/// Everything derived from one raw period cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodInfo {
    /// Calendar month.
    pub period: Period,
    /// Calendar date: the parsed date when one was given, else the first of the month.
    pub date: NaiveDate,
    /// `year * 100 + month`.
    pub key: i32,
    /// Canonical display label, e.g. `"Jan 2024"`.
    pub label: String,
    /// Whether the raw text carries the audit marker.
    pub audited: bool,
}

#[derive(Debug, Clone)]
enum YearMatcher {
    Loose(Regex),
    Strict { four_digit: Regex, after_month: Regex },
}

/// Parses raw period cells under a [`NormalizationPolicy`].
#[derive(Debug, Clone)]
pub struct PeriodParser {
    months: Vec<(String, u32)>,
    labels: [String; 12],
    year: YearMatcher,
    day_first: bool,
    audit_marker: String,
    audit_exclusions: Vec<String>,
    min_year: i32,
}

impl PeriodParser {
    /// Build a parser from `policy`.
    pub fn new(policy: &NormalizationPolicy) -> Result<Self, PolicyError> {
        policy.validate()?;

        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| PolicyError::Pattern(e.to_string()))
        };
        let year = match policy.year_pattern {
            YearPattern::Loose => YearMatcher::Loose(compile(r"20\d{2}|\d{2}")?),
            YearPattern::Strict => YearMatcher::Strict {
                four_digit: compile(r"\b(?:19|20)\d{2}\b")?,
                after_month: compile(r"^[\s\-'/.,]*(\d{2})\b")?,
            },
        };

        Ok(Self {
            months: policy
                .months
                .iter()
                .map(|m| (m.needle.trim().to_lowercase(), m.month))
                .collect(),
            labels: policy.labels.clone(),
            year,
            day_first: policy.day_first,
            audit_marker: policy.audit_marker.to_lowercase(),
            audit_exclusions: policy
                .audit_exclusions
                .iter()
                .map(|s| s.to_lowercase())
                .collect(),
            min_year: policy.min_year,
        })
    }

    /// Resolve a raw cell to its calendar month.
    pub fn parse(&self, raw: &CellValue) -> Option<Period> {
        self.resolve_date(raw).map(Period::from_date)
    }

    /// Resolve a raw cell to a calendar date: the parsed date itself when the cell
    /// holds a full date, otherwise the first day of the matched month.
    pub fn resolve_date(&self, raw: &CellValue) -> Option<NaiveDate> {
        let date = match raw {
            CellValue::Date(date) => Some(*date),
            CellValue::DateTime(dt) => Some(dt.date()),
            CellValue::Text(text) => self.parse_text(text),
            CellValue::Int(_) | CellValue::Float(_) => self.parse_text(&raw.to_string()),
            CellValue::Empty | CellValue::Bool(_) => None,
        };
        date.filter(|d| d.year() >= self.min_year)
    }

    /// Whether the raw period text carries the audit marker.
    pub fn is_audited(&self, raw: &CellValue) -> bool {
        let CellValue::Text(text) = raw else {
            return false;
        };
        let lower = text.to_lowercase();
        lower.contains(&self.audit_marker)
            && !self
                .audit_exclusions
                .iter()
                .any(|exclusion| lower.contains(exclusion.as_str()))
    }

    /// Parse a cell and derive key, label and audited flag in one pass.
    pub fn parse_info(&self, raw: &CellValue) -> Option<PeriodInfo> {
        let date = self.resolve_date(raw)?;
        let period = Period::from_date(date);
        Some(PeriodInfo {
            period,
            date,
            key: period.key(),
            label: self.label(&period),
            audited: self.is_audited(raw),
        })
    }

    /// Canonical display label for `period`.
    pub fn label(&self, period: &Period) -> String {
        period.label(&self.labels)
    }

    fn parse_text(&self, text: &str) -> Option<NaiveDate> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        self.parse_hard_date(text)
            .filter(|d| d.year() >= self.min_year)
            .or_else(|| self.match_month_text(text))
    }

    fn parse_hard_date(&self, text: &str) -> Option<NaiveDate> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Some(dt.date_naive());
        }
        if let Some(dt) = DATETIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        {
            return Some(dt.date());
        }

        let (preferred, fallback) = if self.day_first {
            (DAY_FIRST_FORMATS, MONTH_FIRST_FORMATS)
        } else {
            (MONTH_FIRST_FORMATS, DAY_FIRST_FORMATS)
        };
        let full_date = ISO_DATE_FORMATS
            .iter()
            .chain(preferred)
            .chain(fallback)
            .chain(ENGLISH_DATE_FORMATS)
            .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok());
        if full_date.is_some() {
            return full_date;
        }

        // Month-only layouts: "2024-01", "January 2024", "Jan 2024".
        NaiveDate::parse_from_str(&format!("{text}-01"), "%Y-%m-%d")
            .or_else(|_| NaiveDate::parse_from_str(&format!("1 {text}"), "%d %B %Y"))
            .ok()
    }

    fn match_month_text(&self, text: &str) -> Option<NaiveDate> {
        let lower = text.to_lowercase();
        let (needle, month) = self
            .months
            .iter()
            .find(|(needle, _)| lower.contains(needle.as_str()))?;
        let year = self.match_year(&lower, needle)?;
        NaiveDate::from_ymd_opt(year, *month, 1)
    }

    fn match_year(&self, lower: &str, needle: &str) -> Option<i32> {
        let token = match &self.year {
            YearMatcher::Loose(pattern) => pattern.find(lower).map(|m| m.as_str())?,
            YearMatcher::Strict {
                four_digit,
                after_month,
            } => match four_digit.find(lower) {
                Some(m) => m.as_str(),
                None => {
                    let start = lower.find(needle)? + needle.len();
                    let rest = lower[start..].trim_start_matches(char::is_alphabetic);
                    after_month.captures(rest)?.get(1)?.as_str()
                }
            },
        };
        let year: i32 = token.parse().ok()?;
        Some(if year < 100 { year + 2000 } else { year })
    }
}
