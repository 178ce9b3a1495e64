#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cell;
pub mod error;
pub mod source;
pub mod table;

pub use cell::CellValue;
pub use error::{LoadError, Result};
pub use source::{CsvOptions, SourceFormat, load_csv, load_path, load_workbook};
pub use table::{RawRecord, RawTable};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
