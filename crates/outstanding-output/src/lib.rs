#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod frame;
pub mod report;
pub mod summary;

pub use export::{ExportError, ExportFormat, Exporter};
pub use frame::{aggregation_frame, dataset_frame};
pub use report::{DashboardReport, DashboardReportBuilder, ReportError};
pub use summary::{KpiSummary, group_thousands};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
