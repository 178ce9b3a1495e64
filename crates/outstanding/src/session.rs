//! One upload's journey through the pipeline.
//!
//! A [`Session`] loads and normalizes an upload once and then answers any
//! number of filter and view requests against the cached [`Dataset`].

use crate::config::Config;
use crate::error::{PipelineError, Result};
use outstanding_analytics::{
    AggregationResult, FilterEngine, FilterSpec, Scale, ValueColumn, build_view, get_view_info,
    list_view_names,
};
use outstanding_data::{RawTable, load_csv, load_path};
use outstanding_normalize::{Dataset, NormalizationReport, TableNormalizer};
use outstanding_output::{DashboardReport, DashboardReportBuilder, KpiSummary};
use std::io::Read;
use std::path::Path;
use tracing::info;

/// Outcome of applying a filter.
#[derive(Debug, Clone, PartialEq)]
pub enum Filtered {
    /// The upload has no usable rows at all.
    NoData,
    /// The upload has rows but the filter excluded all of them.
    Empty,
    /// Matching records.
    Data(Dataset),
}

impl Filtered {
    /// The matching records, if any.
    pub const fn dataset(&self) -> Option<&Dataset> {
        match self {
            Self::Data(dataset) => Some(dataset),
            Self::NoData | Self::Empty => None,
        }
    }
}

/// A loaded, normalized upload.
#[derive(Debug, Clone)]
pub struct Session {
    config: Config,
    source: String,
    raw: RawTable,
    dataset: Dataset,
    report: NormalizationReport,
}

impl Session {
    /// Load the upload at `path`.
    pub fn open(path: &Path, config: Config) -> Result<Self> {
        let raw = load_path(path, config.csv)?;
        Self::from_table(raw, path.display().to_string(), config)
    }

    /// Load a CSV upload held in memory.
    pub fn from_csv<R: Read>(reader: R, source: &str, config: Config) -> Result<Self> {
        let raw = load_csv(reader, source, config.csv)?;
        Self::from_table(raw, source.to_string(), config)
    }

    /// Normalize an already loaded table.
    pub fn from_table(raw: RawTable, source: String, config: Config) -> Result<Self> {
        let normalizer = TableNormalizer::new(&config.policy, config.schema.clone())?;
        let normalized = normalizer.normalize(&raw, &config.required_columns())?;
        info!(
            source = %source,
            kept = normalized.report.kept_count(),
            dropped = normalized.report.dropped_count(),
            "session ready"
        );
        Ok(Self {
            config,
            source,
            raw,
            dataset: normalized.dataset,
            report: normalized.report,
        })
    }

    /// Configuration the upload was normalized with.
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Name of the upload.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The upload as read.
    pub const fn raw(&self) -> &RawTable {
        &self.raw
    }

    /// The normalized dataset.
    pub const fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Which rows were dropped and why.
    pub const fn report(&self) -> &NormalizationReport {
        &self.report
    }

    /// The widest filter: every category value and the full date range.
    pub fn default_filter(&self) -> FilterSpec {
        FilterSpec::select_all(&self.dataset)
    }

    /// Apply `spec` to the cached dataset.
    pub fn filter(&self, spec: &FilterSpec) -> Filtered {
        if self.dataset.is_empty() {
            return Filtered::NoData;
        }
        let filtered = FilterEngine::apply(&self.dataset, spec);
        if filtered.is_empty() {
            Filtered::Empty
        } else {
            Filtered::Data(filtered)
        }
    }

    /// Run the view `name` on `dataset`.
    pub fn view(&self, name: &str, dataset: &Dataset) -> Result<AggregationResult> {
        build_view(name, &self.config.schema)
            .map(|view| view.aggregate(dataset))
            .ok_or_else(|| PipelineError::UnknownView(name.to_string()))
    }

    /// Headline figures under `spec`.
    pub fn kpis(&self, spec: &FilterSpec, scale: Scale) -> KpiSummary {
        let filtered = FilterEngine::apply(&self.dataset, spec);
        KpiSummary::from_dataset(&filtered, scale)
    }

    /// KPIs and every applicable view under `spec`, or `None` when nothing matches.
    ///
    /// Monetary view values are divided by `scale`; debtor views are left unscaled.
    pub fn dashboard(&self, spec: &FilterSpec, scale: Scale) -> Result<Option<DashboardReport>> {
        let Filtered::Data(filtered) = self.filter(spec) else {
            return Ok(None);
        };
        let mut builder = DashboardReportBuilder::new()
            .source(self.source.clone())
            .filter(spec.clone())
            .dropped_rows(self.report.dropped_count())
            .kpis(KpiSummary::from_dataset(&filtered, scale));
        for name in list_view_names() {
            let Some(view) = build_view(name, &self.config.schema) else {
                continue;
            };
            let result = view.aggregate(&filtered);
            let counts_debtors =
                get_view_info(name).is_some_and(|info| info.value == ValueColumn::Debtors);
            let result = if counts_debtors {
                result
            } else {
                result.scaled(scale)
            };
            builder = builder.view(name, result);
        }
        Ok(Some(builder.build()?))
    }
}
