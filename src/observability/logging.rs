//! Structured logging.
//!
//! # Responsibilities
//! - Build the logger once from [`Settings`]
//! - Resolve level, pod name and line tag
//! - Fan events out to the console and, when requested, to a log file
//!
//! # Design Decisions
//! - Uses `tracing` + `tracing-subscriber` layers; the [`Logger`] owns its
//!   own [`Dispatch`] instead of touching the global default
//! - Console lines are rendered directly; file lines go through a JSON
//!   envelope that the [`FileSink`] unpacks
//! - File-open failures are returned by [`LoggerBuilder::build`];
//!   [`LoggerBuilder::build_or_console`] keeps logging to the console

use std::io;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Local};
use thiserror::Error;
use tracing::Dispatch;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;

use crate::config::{load_settings_or_default, Settings};
use crate::observability::envelope::EnvelopeFormat;
use crate::observability::file_sink::FileSink;
use crate::observability::format::{wire_time, ConsoleFormat, FileFormat};
use crate::observability::level::Severity;

/// Pod name used when the configured variable is missing or empty.
pub const DEFAULT_POD_NAME: &str = "DEFAULT";

/// Hour bucket appended to log file names.
const FILE_HOUR_FORMAT: &str = "%Y%m%d-%H";

/// Errors raised while building a logger.
#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("failed to open log file {path}: {source}")]
    OpenLogFile {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Read the pod name from the variable called `var`.
pub fn resolve_pod_name(var: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    if var.is_empty() {
        return DEFAULT_POD_NAME.to_string();
    }
    match lookup(var) {
        Some(value) if !value.is_empty() => value,
        _ => DEFAULT_POD_NAME.to_string(),
    }
}

/// Tag shown on every line: the configured gid, else the pod name.
pub fn display_tag(gid: &str, pod_name: &str) -> String {
    if gid.is_empty() {
        pod_name.to_string()
    } else {
        gid.to_string()
    }
}

/// `<filePath><system><area><group>_<pod>_<logType>_<level>_<YYYYMMDD-HH>.log`
pub fn log_file_path(
    settings: &Settings,
    pod_name: &str,
    level: Severity,
    at: DateTime<Local>,
) -> PathBuf {
    PathBuf::from(format!(
        "{}{}{}{}_{}_{}_{}_{}.log",
        settings.file_path,
        settings.system,
        settings.area,
        settings.group,
        pod_name,
        settings.log_type,
        level,
        at.format(FILE_HOUR_FORMAT),
    ))
}

type EnvLookup = Box<dyn Fn(&str) -> Option<String>>;

/// Builder for a [`Logger`].
pub struct LoggerBuilder {
    settings: Settings,
    console: BoxMakeWriter,
    env_lookup: EnvLookup,
    now: Option<DateTime<Local>>,
}

impl LoggerBuilder {
    /// Console output goes to stderr unless replaced.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            console: BoxMakeWriter::new(io::stderr),
            env_lookup: Box::new(|name| std::env::var(name).ok()),
            now: None,
        }
    }

    /// Replace the console target.
    pub fn console_writer<W>(mut self, writer: W) -> Self
    where
        W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
    {
        self.console = BoxMakeWriter::new(writer);
        self
    }

    /// Replace the environment lookup used to resolve the pod name.
    pub fn env_lookup(mut self, lookup: impl Fn(&str) -> Option<String> + 'static) -> Self {
        self.env_lookup = Box::new(lookup);
        self
    }

    /// Fix the time used for the log file's hour bucket.
    pub fn clock(mut self, now: DateTime<Local>) -> Self {
        self.now = Some(now);
        self
    }

    /// Build the logger. Fails if the log file cannot be opened.
    pub fn build(self) -> Result<Logger, LoggerError> {
        let resolved = self.resolve();
        let file = match &resolved.file_path {
            Some(path) => Some(open_sink(path, &resolved.tag)?),
            None => None,
        };
        Ok(self.assemble(resolved, file))
    }

    /// Build the logger, logging to the console only if the file cannot be opened.
    ///
    /// The open failure is logged at ERROR, subject to the configured level.
    #[track_caller]
    pub fn build_or_console(self) -> Logger {
        let location = Location::caller();
        let resolved = self.resolve();
        let (file, open_error) = match &resolved.file_path {
            Some(path) => match open_sink(path, &resolved.tag) {
                Ok(sink) => (Some(sink), None),
                Err(e) => (None, Some(e)),
            },
            None => (None, None),
        };

        let logger = self.assemble(resolved, file);
        if let Some(e) = open_error {
            let message = format!("log file unavailable, logging to console only: {}", e);
            logger.log_at(Severity::Error, location, &message);
        }
        logger
    }

    fn resolve(&self) -> Resolved {
        let level = Severity::parse_or_default(&self.settings.level);
        let pod_name = resolve_pod_name(&self.settings.pod, &self.env_lookup);
        let tag = display_tag(&self.settings.gid, &pod_name);
        let file_path = self.settings.prints_to_file().then(|| {
            let now = self.now.unwrap_or_else(Local::now);
            log_file_path(&self.settings, &pod_name, level, now)
        });

        Resolved {
            level,
            pod_name,
            tag,
            file_path,
        }
    }

    fn assemble(self, resolved: Resolved, file: Option<FileSink>) -> Logger {
        let tag: Arc<str> = Arc::from(resolved.tag.as_str());

        let console_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(self.console)
            .event_format(ConsoleFormat::new(tag.clone()));

        let file_layer = file.clone().map(|sink| {
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(sink)
                .event_format(EnvelopeFormat::new(tag.clone()))
        });

        let subscriber = tracing_subscriber::registry()
            .with(resolved.level.level_filter())
            .with(console_layer)
            .with(file_layer);

        Logger {
            inner: Arc::new(LoggerInner {
                dispatch: Dispatch::new(subscriber),
                level: resolved.level,
                pod_name: resolved.pod_name,
                tag: resolved.tag,
                file,
            }),
        }
    }
}

struct Resolved {
    level: Severity,
    pod_name: String,
    tag: String,
    file_path: Option<PathBuf>,
}

fn open_sink(path: &Path, tag: &str) -> Result<FileSink, LoggerError> {
    FileSink::open(path, FileFormat::new(tag)).map_err(|source| LoggerError::OpenLogFile {
        path: path.display().to_string(),
        source,
    })
}

/// Shared logger handle. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Logger {
    inner: Arc<LoggerInner>,
}

#[derive(Debug)]
struct LoggerInner {
    dispatch: Dispatch,
    level: Severity,
    pod_name: String,
    tag: String,
    file: Option<FileSink>,
}

impl Logger {
    /// Load settings from `path` and build a logger, falling back to
    /// defaults and console output on any error.
    #[track_caller]
    pub fn from_config_file(path: &Path) -> Logger {
        let (settings, config_error) = load_settings_or_default(path);
        let logger = LoggerBuilder::new(settings).build_or_console();
        if let Some(e) = config_error {
            let message = format!("using default settings: {}", e);
            logger.log_at(Severity::Warn, Location::caller(), &message);
        }
        logger
    }

    /// Minimum severity that gets logged.
    pub fn level(&self) -> Severity {
        self.inner.level
    }

    pub fn pod_name(&self) -> &str {
        &self.inner.pod_name
    }

    pub fn tag(&self) -> &str {
        &self.inner.tag
    }

    /// Path of the log file, if file output is active.
    pub fn log_file(&self) -> Option<&Path> {
        self.inner.file.as_ref().map(FileSink::path)
    }

    /// The dispatcher behind this logger, for use with the `tracing` macros.
    pub fn dispatch(&self) -> &Dispatch {
        &self.inner.dispatch
    }

    /// Run `f` with this logger as the thread's default `tracing` dispatcher.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.inner.dispatch, f)
    }

    #[track_caller]
    pub fn trace(&self, message: &str) {
        self.log_at(Severity::Trace, Location::caller(), message);
    }

    #[track_caller]
    pub fn debug(&self, message: &str) {
        self.log_at(Severity::Debug, Location::caller(), message);
    }

    #[track_caller]
    pub fn info(&self, message: &str) {
        self.log_at(Severity::Info, Location::caller(), message);
    }

    #[track_caller]
    pub fn warn(&self, message: &str) {
        self.log_at(Severity::Warn, Location::caller(), message);
    }

    #[track_caller]
    pub fn error(&self, message: &str) {
        self.log_at(Severity::Error, Location::caller(), message);
    }

    /// Log at FATAL, flush, and exit the process with status 1.
    #[track_caller]
    pub fn fatal(&self, message: &str) -> ! {
        self.log_at(Severity::Fatal, Location::caller(), message);
        let _ = self.flush();
        std::process::exit(1)
    }

    /// Log at an arbitrary severity. `Fatal` is logged but does not exit.
    #[track_caller]
    pub fn log(&self, severity: Severity, message: &str) {
        self.log_at(severity, Location::caller(), message);
    }

    pub(crate) fn log_at(&self, severity: Severity, location: &Location<'_>, message: &str) {
        if !self.inner.level.allows(severity) {
            return;
        }
        let caller = format!("{}:{}", location.file(), location.line());
        // One timestamp per call, shared by the console and file layers.
        let time = wire_time(Local::now());
        let (caller, time) = (caller.as_str(), time.as_str());
        self.in_scope(|| match severity {
            Severity::Trace => tracing::trace!(caller, log_time = time, "{}", message),
            Severity::Debug => tracing::debug!(caller, log_time = time, "{}", message),
            Severity::Info => tracing::info!(caller, log_time = time, "{}", message),
            Severity::Warn => tracing::warn!(caller, log_time = time, "{}", message),
            Severity::Error => tracing::error!(caller, log_time = time, "{}", message),
            Severity::Fatal => {
                tracing::error!(caller, log_time = time, fatal = true, "{}", message)
            }
        });
    }

    /// Flush the log file, if any.
    pub fn flush(&self) -> io::Result<()> {
        match &self.inner.file {
            Some(sink) => sink.flush(),
            None => Ok(()),
        }
    }

    /// Flush and release this handle.
    pub fn shutdown(self) -> io::Result<()> {
        self.flush()
    }
}
