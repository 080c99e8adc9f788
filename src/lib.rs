//! Process-wide structured logger.
//!
//! Settings come from a YAML file (`setting-local.yml`, top-level `env`);
//! log lines go to the console and, when `printType` asks for it, to an
//! hour-bucketed log file.
//!
//! ```no_run
//! use std::path::Path;
//! use common_log::Logger;
//!
//! let logger = Logger::from_config_file(Path::new("setting-local.yml"));
//! logger.info("service started");
//! common_log::observability::global::install(logger).ok();
//! common_log::warn("queue depth above threshold");
//! ```

pub mod config;
pub mod observability;

pub use config::Settings;
pub use observability::global::{debug, error, fatal, info, trace, warn};
pub use observability::{Logger, LoggerBuilder, Severity};
