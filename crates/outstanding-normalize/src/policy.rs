//! Locale and format policy for normalization.
//!
//! Every convention the parsers depend on (separators, month names, label
//! abbreviations, year matching, audit markers) is held here so that all
//! dashboards share one definition instead of embedding literals.

use crate::error::PolicyError;
use serde::{Deserialize, Serialize};

/// How to read a number containing only the decimal separator, e.g. `"1,5"` or `"1,500"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoneDecimal {
    /// A single separator followed by at most `max_fraction_digits` digits is a decimal
    /// point; anything else is a thousands separator.
    Decimal {
        /// Longest fraction still read as decimal (default: 2)
        max_fraction_digits: usize,
    },

    /// Always a thousands separator.
    Thousands,
}

impl Default for LoneDecimal {
    fn default() -> Self {
        Self::Decimal {
            max_fraction_digits: 2,
        }
    }
}

/// How a year is located in free-text periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YearPattern {
    /// First `20xx` or two-digit run anywhere in the text. High recall, but an
    /// unrelated number such as `"rev 12"` can be taken as the year.
    #[default]
    Loose,

    /// A whole-word `19xx`/`20xx`, or a two-digit token directly after the month name
    /// (`"Jan-24"`, `"Mei '23"`).
    Strict,
}

/// One entry of the month lookup table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthName {
    /// Lower-case substring searched for in the period text.
    pub needle: String,
    /// Month number, 1-12.
    pub month: u32,
}

impl MonthName {
    fn new(needle: &str, month: u32) -> Self {
        Self {
            needle: needle.to_string(),
            month,
        }
    }
}

/// Normalization policy shared by the value and period parsers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationPolicy {
    /// Thousands grouping separator (default: `.`)
    pub thousands_separator: char,
    /// Decimal separator (default: `,`)
    pub decimal_separator: char,
    /// Reading of text containing only the decimal separator
    pub lone_decimal: LoneDecimal,
    /// Month lookup table; earlier entries win when several match
    pub months: Vec<MonthName>,
    /// Display abbreviations for January..December
    pub labels: [String; 12],
    /// Year matching in free text
    pub year_pattern: YearPattern,
    /// Read `01/02/2024` as 1 February (default: true)
    pub day_first: bool,
    /// Case-insensitive substring marking an audited figure (default: `audit`)
    pub audit_marker: String,
    /// Substrings that cancel the audit marker, e.g. `unaudit` (default: none)
    pub audit_exclusions: Vec<String>,
    /// Earliest accepted year (default: 1900)
    pub min_year: i32,
}

impl Default for NormalizationPolicy {
    fn default() -> Self {
        Self::indonesian()
    }
}

impl NormalizationPolicy {
    /// Indonesian reporting convention: `.` groups thousands, `,` marks decimals,
    /// Indonesian and English month abbreviations, Indonesian labels.
    pub fn indonesian() -> Self {
        let months = [
            ("jan", 1),
            ("feb", 2),
            ("mar", 3),
            ("apr", 4),
            ("mei", 5),
            ("may", 5),
            ("jun", 6),
            ("jul", 7),
            ("agu", 8),
            ("aug", 8),
            ("sep", 9),
            ("okt", 10),
            ("oct", 10),
            ("nov", 11),
            ("nop", 11),
            ("des", 12),
            ("dec", 12),
        ]
        .into_iter()
        .map(|(needle, month)| MonthName::new(needle, month))
        .collect();

        let labels = [
            "Jan", "Feb", "Mar", "Apr", "Mei", "Jun", "Jul", "Agu", "Sep", "Okt", "Nov", "Des",
        ]
        .map(String::from);

        Self {
            thousands_separator: '.',
            decimal_separator: ',',
            lone_decimal: LoneDecimal::default(),
            months,
            labels,
            year_pattern: YearPattern::Loose,
            day_first: true,
            audit_marker: "audit".to_string(),
            audit_exclusions: Vec::new(),
            min_year: 1900,
        }
    }

    /// Check the policy for contradictions before building parsers from it.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.thousands_separator == self.decimal_separator {
            return Err(PolicyError::SameSeparator(self.decimal_separator));
        }
        if self.months.is_empty() {
            return Err(PolicyError::EmptyMonthTable);
        }
        for entry in &self.months {
            if entry.needle.trim().is_empty() || !(1..=12).contains(&entry.month) {
                return Err(PolicyError::InvalidMonth {
                    needle: entry.needle.clone(),
                    month: entry.month,
                });
            }
        }
        if self.audit_marker.trim().is_empty() {
            return Err(PolicyError::EmptyAuditMarker);
        }
        Ok(())
    }
}
