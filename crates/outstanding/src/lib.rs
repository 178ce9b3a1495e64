#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod session;

// Re-export main types from sub-crates
pub use outstanding_analytics as analytics;
pub use outstanding_data as data;
pub use outstanding_normalize as normalize;
pub use outstanding_output as output;

pub use config::{Config, ConfigError, default_config_path};
pub use error::{PipelineError, Result};
pub use session::{Filtered, Session};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
