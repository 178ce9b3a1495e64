//! Column layout of an upload.

use serde::{Deserialize, Serialize};

/// Name of the derived period key column.
pub const PERIOD_KEY_COLUMN: &str = "period_key";

/// Name of the derived period label column.
pub const PERIOD_LABEL_COLUMN: &str = "period_label";

/// Name of the derived audited flag column.
pub const AUDITED_COLUMN: &str = "is_audited";

/// Which upload columns carry the period, the amounts and the categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnSchema {
    /// Period column (default: `Periode`)
    pub period: String,
    /// Outstanding amount column (default: `Value`)
    pub value: String,
    /// Debtor count column, if the upload has one (default: `Jumlah Debitur`)
    pub debtors: Option<String>,
    /// Categorical columns offered as filters (default: `Jenis`, `Generasi`)
    pub categories: Vec<String>,
}

impl Default for ColumnSchema {
    fn default() -> Self {
        Self {
            period: "Periode".to_string(),
            value: "Value".to_string(),
            debtors: Some("Jumlah Debitur".to_string()),
            categories: vec!["Jenis".to_string(), "Generasi".to_string()],
        }
    }
}

impl ColumnSchema {
    /// The smallest accepted layout: `Periode` and `Value` only.
    pub fn minimal() -> Self {
        Self {
            debtors: None,
            categories: Vec::new(),
            ..Self::default()
        }
    }

    /// Every column this schema names, period and value first.
    pub fn required_columns(&self) -> Vec<&str> {
        let mut columns = vec![self.period.as_str(), self.value.as_str()];
        columns.extend(self.categories.iter().map(String::as_str));
        columns.extend(self.debtors.as_deref());
        columns
    }

    /// Whether `column` is one of the categorical columns.
    pub fn is_category(&self, column: &str) -> bool {
        self.categories.iter().any(|c| c == column)
    }
}
