//! Numeric value coercion.
//!
//! Amounts arrive as numbers (spreadsheets) or as locale-formatted text
//! (`"1.234.567"`, `"1.234,56"`). The separator rules are:
//!
//! | text contains                 | reading                                         |
//! |-------------------------------|-------------------------------------------------|
//! | thousands and decimal sep.    | drop thousands, decimal becomes `.`             |
//! | only the thousands separator  | drop it (`"1.234"` is 1234, never 1.234)        |
//! | only the decimal separator    | [`LoneDecimal`] policy                          |
//! | neither                       | parsed as is                                    |
//!
//! Parsing never fails loudly: anything unreadable is `None`.

use crate::policy::{LoneDecimal, NormalizationPolicy};
use outstanding_data::CellValue;

/// Coerces raw cells into amounts under a [`NormalizationPolicy`].
#[derive(Debug, Clone, Copy)]
pub struct ValueParser {
    thousands: char,
    decimal: char,
    lone_decimal: LoneDecimal,
}

impl Default for ValueParser {
    fn default() -> Self {
        Self::new(&NormalizationPolicy::default())
    }
}

impl ValueParser {
    /// Create a parser from the separator settings of `policy`.
    pub const fn new(policy: &NormalizationPolicy) -> Self {
        Self {
            thousands: policy.thousands_separator,
            decimal: policy.decimal_separator,
            lone_decimal: policy.lone_decimal,
        }
    }

    /// Parse a cell into an amount.
    ///
    /// Numbers pass through unchanged; text follows the separator rules.
    pub fn parse(&self, raw: &CellValue) -> Option<f64> {
        match raw {
            CellValue::Int(v) => Some(*v as f64),
            CellValue::Float(v) => v.is_finite().then_some(*v),
            CellValue::Text(text) => self.parse_str(text),
            CellValue::Empty | CellValue::Bool(_) | CellValue::Date(_) | CellValue::DateTime(_) => {
                None
            }
        }
    }

    /// Parse locale-formatted text into an amount.
    pub fn parse_str(&self, text: &str) -> Option<f64> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let has_thousands = text.contains(self.thousands);
        let has_decimal = text.contains(self.decimal);

        let normalized = match (has_thousands, has_decimal) {
            (true, true) => text
                .replace(self.thousands, "")
                .replace(self.decimal, "."),
            (true, false) => text.replace(self.thousands, ""),
            (false, true) => self.resolve_lone_decimal(text),
            (false, false) => text.to_string(),
        };

        normalized.parse::<f64>().ok().filter(|v| v.is_finite())
    }

    /// Plain numeric coercion without any separator policy.
    ///
    /// Used for counts such as the debtor column, where `"1.5"` means 1.5.
    pub fn parse_plain(raw: &CellValue) -> Option<f64> {
        match raw {
            CellValue::Int(v) => Some(*v as f64),
            CellValue::Float(v) => v.is_finite().then_some(*v),
            CellValue::Text(text) => text.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        }
    }

    fn resolve_lone_decimal(&self, text: &str) -> String {
        match self.lone_decimal {
            LoneDecimal::Thousands => text.replace(self.decimal, ""),
            LoneDecimal::Decimal {
                max_fraction_digits,
            } => {
                let mut parts = text.splitn(2, self.decimal);
                let fraction = parts.nth(1).unwrap_or_default();
                let is_decimal = !fraction.contains(self.decimal)
                    && (1..=max_fraction_digits).contains(&fraction.len())
                    && fraction.chars().all(|c| c.is_ascii_digit());
                if is_decimal {
                    text.replace(self.decimal, ".")
                } else {
                    text.replace(self.decimal, "")
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case("1.234.567", 1_234_567.0)]
    #[case("1.234,56", 1234.56)]
    #[case("600.822.115,84", 600_822_115.84)]
    #[case("  12.500  ", 12_500.0)]
    #[case("1,5", 1.5)]
    #[case("1,50", 1.5)]
    #[case("1,500", 1500.0)]
    #[case("1,500,000", 1_500_000.0)]
    #[case("-2.000,25", -2000.25)]
    #[case("42", 42.0)]
    fn test_parse_text(#[case] raw: &str, #[case] expected: f64) {
        let parser = ValueParser::default();
        assert_relative_eq!(parser.parse_str(raw).unwrap(), expected, epsilon = 1e-9);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("abc")]
    #[case("NaN")]
    #[case("inf")]
    #[case("1.2a")]
    fn test_unparsable_text_is_missing(#[case] raw: &str) {
        assert!(ValueParser::default().parse_str(raw).is_none());
    }

    #[test]
    fn test_numeric_cells_pass_through() {
        let parser = ValueParser::default();
        assert_eq!(parser.parse(&CellValue::Float(1234.5)), Some(1234.5));
        assert_eq!(parser.parse(&CellValue::Int(7)), Some(7.0));
        assert_eq!(parser.parse(&CellValue::Float(f64::NAN)), None);
        assert_eq!(parser.parse(&CellValue::Empty), None);
        assert_eq!(parser.parse(&CellValue::Bool(true)), None);
    }

    #[test]
    fn test_lone_decimal_as_thousands() {
        let policy = NormalizationPolicy {
            lone_decimal: LoneDecimal::Thousands,
            ..Default::default()
        };
        let parser = ValueParser::new(&policy);
        assert_eq!(parser.parse_str("1,5"), Some(15.0));
    }

    #[test]
    fn test_english_separators() {
        let policy = NormalizationPolicy {
            thousands_separator: ',',
            decimal_separator: '.',
            ..Default::default()
        };
        let parser = ValueParser::new(&policy);
        assert_eq!(parser.parse_str("1,234.56"), Some(1234.56));
        assert_eq!(parser.parse_str("1,234,567"), Some(1_234_567.0));
        assert_eq!(parser.parse_str("12.5"), Some(12.5));
        assert_eq!(parser.parse_str("1.234"), Some(1234.0));
    }

    #[test]
    fn test_parse_plain_ignores_separator_policy() {
        assert_eq!(
            ValueParser::parse_plain(&CellValue::Text("1.5".to_string())),
            Some(1.5)
        );
        assert_eq!(ValueParser::parse_plain(&CellValue::Text("1.234,5".to_string())), None);
        assert_eq!(ValueParser::parse_plain(&CellValue::Int(120)), Some(120.0));
        assert_eq!(ValueParser::parse_plain(&CellValue::Empty), None);
    }
}
