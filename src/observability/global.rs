//! Process-wide logger.
//!
//! Applications normally build a [`Logger`] at startup and [`install`] it.
//! The free functions below forward to the installed logger; if nothing was
//! installed, the first call builds one from [`CONFIG_FILE_NAME`] in the
//! working directory.

use std::panic::Location;
use std::path::Path;
use std::sync::OnceLock;

use crate::config::CONFIG_FILE_NAME;
use crate::observability::level::Severity;
use crate::observability::logging::Logger;

static LOGGER: OnceLock<Logger> = OnceLock::new();

/// Install `logger` as the process-wide logger.
///
/// Returns the logger back if one is already installed.
pub fn install(logger: Logger) -> Result<(), Logger> {
    LOGGER.set(logger)
}

/// The process-wide logger, built from the settings file on first use.
pub fn logger() -> &'static Logger {
    LOGGER.get_or_init(|| Logger::from_config_file(Path::new(CONFIG_FILE_NAME)))
}

#[track_caller]
pub fn trace(message: &str) {
    logger().log_at(Severity::Trace, Location::caller(), message);
}

#[track_caller]
pub fn debug(message: &str) {
    logger().log_at(Severity::Debug, Location::caller(), message);
}

#[track_caller]
pub fn info(message: &str) {
    logger().log_at(Severity::Info, Location::caller(), message);
}

#[track_caller]
pub fn warn(message: &str) {
    logger().log_at(Severity::Warn, Location::caller(), message);
}

#[track_caller]
pub fn error(message: &str) {
    logger().log_at(Severity::Error, Location::caller(), message);
}

/// Log at FATAL through the process-wide logger, then exit with status 1.
#[track_caller]
pub fn fatal(message: &str) -> ! {
    let logger = logger();
    logger.log_at(Severity::Fatal, Location::caller(), message);
    let _ = logger.flush();
    std::process::exit(1)
}
