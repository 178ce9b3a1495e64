//! JSON dashboard reports.

use crate::summary::KpiSummary;
use chrono::{DateTime, Utc};
use outstanding_analytics::{AggregationResult, FilterSpec};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The builder was not given a KPI summary.
    #[error("Report is missing its KPI summary")]
    MissingSummary,
}

/// Everything one dashboard render shows, as a serializable document.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    /// Name of the uploaded file.
    pub source: String,

    /// Report generation timestamp.
    pub generated_at: DateTime<Utc>,

    /// Filter the figures were computed under.
    pub filter: Option<FilterSpec>,

    /// Rows dropped during normalization.
    pub dropped_rows: usize,

    /// Headline figures.
    pub kpis: KpiSummary,

    /// View results by view name.
    pub views: BTreeMap<String, AggregationResult>,
}

impl DashboardReport {
    /// Convert report to JSON string.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report as pretty JSON to `path`.
    pub fn write_to(&self, path: &Path) -> Result<(), ReportError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Builder for creating reports.
#[derive(Debug, Default)]
pub struct DashboardReportBuilder {
    source: Option<String>,
    filter: Option<FilterSpec>,
    dropped_rows: usize,
    kpis: Option<KpiSummary>,
    views: BTreeMap<String, AggregationResult>,
}

impl DashboardReportBuilder {
    /// Create a new report builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the source name.
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Set the filter echo.
    pub fn filter(mut self, filter: FilterSpec) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Set the number of rows dropped during normalization.
    pub const fn dropped_rows(mut self, dropped: usize) -> Self {
        self.dropped_rows = dropped;
        self
    }

    /// Set the KPI summary.
    pub fn kpis(mut self, kpis: KpiSummary) -> Self {
        self.kpis = Some(kpis);
        self
    }

    /// Add a named view result.
    pub fn view(mut self, name: impl Into<String>, result: AggregationResult) -> Self {
        self.views.insert(name.into(), result);
        self
    }

    /// Build the report.
    pub fn build(self) -> Result<DashboardReport, ReportError> {
        Ok(DashboardReport {
            source: self.source.unwrap_or_default(),
            generated_at: Utc::now(),
            filter: self.filter,
            dropped_rows: self.dropped_rows,
            kpis: self.kpis.ok_or(ReportError::MissingSummary)?,
            views: self.views,
        })
    }
}
