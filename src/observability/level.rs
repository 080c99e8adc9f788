//! Severity levels.
//!
//! `tracing` has no level above ERROR, so FATAL events are emitted at
//! ERROR and marked with a `fatal` field. Filtering happens on
//! [`Severity`] in the logger handle so `fatal` can be kept apart from `error`.

use std::fmt;
use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::filter::LevelFilter;

/// Log severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Severity {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Fatal,
}

impl Severity {
    /// Parse a configured level, falling back to [`Severity::Info`].
    pub fn parse_or_default(level: &str) -> Self {
        level.parse().unwrap_or_default()
    }

    /// Lower-case name, as used in file names and JSON records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "trace",
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
        }
    }

    /// Whether a record at `severity` passes a filter set to `self`.
    pub fn allows(&self, severity: Severity) -> bool {
        severity >= *self
    }

    /// The `tracing` level events of this severity are emitted at.
    pub fn tracing_level(&self) -> Level {
        match self {
            Severity::Trace => Level::TRACE,
            Severity::Debug => Level::DEBUG,
            Severity::Info => Level::INFO,
            Severity::Warn => Level::WARN,
            Severity::Error | Severity::Fatal => Level::ERROR,
        }
    }

    /// Subscriber-wide filter matching this minimum severity.
    pub fn level_filter(&self) -> LevelFilter {
        LevelFilter::from_level(self.tracing_level())
    }

    /// Map a `tracing` level back, honoring the `fatal` marker.
    pub fn from_tracing(level: &Level, fatal: bool) -> Self {
        match *level {
            Level::TRACE => Severity::Trace,
            Level::DEBUG => Severity::Debug,
            Level::INFO => Severity::Info,
            Level::WARN => Severity::Warn,
            _ if fatal => Severity::Fatal,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned for an unrecognized level name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log level: {0:?}")]
pub struct ParseSeverityError(pub String);

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Severity::Trace),
            "debug" => Ok(Severity::Debug),
            "info" => Ok(Severity::Info),
            "warn" | "warning" => Ok(Severity::Warn),
            "error" => Ok(Severity::Error),
            "fatal" => Ok(Severity::Fatal),
            _ => Err(ParseSeverityError(s.to_string())),
        }
    }
}
