#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod dataset;
pub mod error;
pub mod normalizer;
pub mod period;
pub mod policy;
pub mod schema;
pub mod value;

pub use dataset::{Dataset, NormalizedRecord};
pub use error::{NormalizeError, PolicyError, Result, SchemaError};
pub use normalizer::{DropReason, DroppedRow, NormalizationReport, Normalized, TableNormalizer};
pub use period::{Period, PeriodInfo, PeriodParser};
pub use policy::{LoneDecimal, MonthName, NormalizationPolicy, YearPattern};
pub use schema::{AUDITED_COLUMN, ColumnSchema, PERIOD_KEY_COLUMN, PERIOD_LABEL_COLUMN};
pub use value::ValueParser;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
