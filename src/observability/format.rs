//! Line formatting shared by the console and file sinks.
//!
//! Every sink renders the same layout:
//!
//! ```text
//! 24-05-01 13:07:42 WARN handler.rs:88 [[[((g-01)) upstream slow ]]]
//! ```
//!
//! [`LineFormat`] holds the rendering routine. [`ConsoleFormat`] plugs it
//! into `tracing-subscriber` as a [`FormatEvent`]; [`FileFormat`] is driven
//! by the file sink after it has decoded a JSON envelope.

use std::fmt::{self, Write as _};
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Local, SecondsFormat};
use thiserror::Error;
use tracing::field::{Field, Visit};
use tracing::{Event, Metadata, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

use crate::observability::level::Severity;

/// Rendered timestamp layout (`YY-MM-DD HH:MM:SS`).
pub const DISPLAY_TIME_FORMAT: &str = "%y-%m-%d %H:%M:%S";

/// Field carrying the application call site (`file:line`).
const CALLER_FIELD: &str = "caller";
/// Field marking an ERROR-level event as fatal.
const FATAL_FIELD: &str = "fatal";
/// Field carrying the RFC 3339 time captured at the call site.
const TIME_FIELD: &str = "log_time";
const MESSAGE_FIELD: &str = "message";

/// Errors raised while turning a record into a line.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The timestamp is not RFC 3339.
    #[error("malformed timestamp {value:?}: {source}")]
    Timestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// The outer JSON envelope could not be decoded.
    #[error("malformed log envelope: {0}")]
    Envelope(#[source] serde_json::Error),

    /// The inner JSON record could not be decoded.
    #[error("malformed log record: {0}")]
    Record(#[source] serde_json::Error),
}

/// One log record in wire form, before rendering.
#[derive(Debug, Clone, Copy)]
pub struct LogRecord<'a> {
    /// RFC 3339 timestamp.
    pub time: &'a str,
    pub level: &'a str,
    /// Call site, usually `path/to/file.rs:line`.
    pub caller: &'a str,
    pub message: &'a str,
}

/// Common rendering interface for every output target.
pub trait LineFormat {
    /// Tag wrapped in `((...))` on every line.
    fn tag(&self) -> &str;

    /// Render a record without a trailing newline.
    fn render(&self, record: &LogRecord<'_>) -> Result<String, FormatError> {
        let time = display_time(record.time)?;
        Ok(format!(
            "{} {} {} [[[(({})) {} ]]]",
            time,
            record.level.to_uppercase(),
            caller_base_name(record.caller),
            self.tag(),
            record.message,
        ))
    }
}

/// Console strategy. A malformed timestamp is fatal.
#[derive(Debug, Clone)]
pub struct ConsoleFormat {
    tag: Arc<str>,
}

impl ConsoleFormat {
    pub fn new(tag: impl Into<Arc<str>>) -> Self {
        Self { tag: tag.into() }
    }
}

impl LineFormat for ConsoleFormat {
    fn tag(&self) -> &str {
        &self.tag
    }
}

impl<S, N> FormatEvent<S, N> for ConsoleFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let fields = EventFields::from_event(event);
        let time = fields.time();
        let caller = fields.caller(event.metadata());
        let record = LogRecord {
            time: &time,
            level: fields.severity(event.metadata()).as_str(),
            caller: &caller,
            message: &fields.message,
        };

        let line = match self.render(&record) {
            Ok(line) => line,
            Err(e) => abort_on_format_error(e),
        };
        writeln!(writer, "{}", line)
    }
}

/// File strategy. Malformed input surfaces as an error to the writer.
#[derive(Debug, Clone)]
pub struct FileFormat {
    tag: Arc<str>,
}

impl FileFormat {
    pub fn new(tag: impl Into<Arc<str>>) -> Self {
        Self { tag: tag.into() }
    }

    /// Render a record followed by a newline.
    pub fn render_line(&self, record: &LogRecord<'_>) -> Result<String, FormatError> {
        let mut line = self.render(record)?;
        line.push('\n');
        Ok(line)
    }
}

impl LineFormat for FileFormat {
    fn tag(&self) -> &str {
        &self.tag
    }
}

/// Timestamp in wire form (RFC 3339, second precision).
pub fn wire_time(at: DateTime<Local>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Re-render an RFC 3339 timestamp as `YY-MM-DD HH:MM:SS`, keeping its offset.
pub fn display_time(wire: &str) -> Result<String, FormatError> {
    let parsed = DateTime::parse_from_rfc3339(wire).map_err(|source| FormatError::Timestamp {
        value: wire.to_string(),
        source,
    })?;
    Ok(parsed.format(DISPLAY_TIME_FORMAT).to_string())
}

/// Strip the directory from a `path/file.rs:line` call site.
pub fn caller_base_name(caller: &str) -> &str {
    Path::new(caller)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(caller)
}

fn abort_on_format_error(err: FormatError) -> ! {
    eprintln!("console log formatting failed: {}", err);
    std::process::exit(1)
}

/// Fields collected from a `tracing` event.
#[derive(Debug, Default)]
pub(crate) struct EventFields {
    pub message: String,
    pub caller: Option<String>,
    pub time: Option<String>,
    pub fatal: bool,
}

impl EventFields {
    pub fn from_event(event: &Event<'_>) -> Self {
        let mut fields = Self::default();
        event.record(&mut fields);
        fields
    }

    pub fn severity(&self, metadata: &Metadata<'_>) -> Severity {
        Severity::from_tracing(metadata.level(), self.fatal)
    }

    /// Recorded call time, or now for events without one.
    pub fn time(&self) -> String {
        self.time
            .clone()
            .unwrap_or_else(|| wire_time(Local::now()))
    }

    /// Recorded call site, or the event's own source location.
    pub fn caller(&self, metadata: &Metadata<'_>) -> String {
        if let Some(caller) = &self.caller {
            return caller.clone();
        }
        match (metadata.file(), metadata.line()) {
            (Some(file), Some(line)) => format!("{}:{}", file, line),
            (Some(file), None) => file.to_string(),
            _ => metadata.target().to_string(),
        }
    }

    fn push_extra(&mut self, name: &str, value: fmt::Arguments<'_>) {
        let _ = write!(self.message, " {}={}", name, value);
    }
}

impl Visit for EventFields {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            MESSAGE_FIELD => self.message.insert_str(0, value),
            CALLER_FIELD => self.caller = Some(value.to_string()),
            TIME_FIELD => self.time = Some(value.to_string()),
            name => self.push_extra(name, format_args!("{}", value)),
        }
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        match field.name() {
            FATAL_FIELD => self.fatal = value,
            name => self.push_extra(name, format_args!("{}", value)),
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        match field.name() {
            MESSAGE_FIELD => self.message.insert_str(0, &format!("{:?}", value)),
            CALLER_FIELD => self.caller = Some(format!("{:?}", value)),
            TIME_FIELD => self.time = Some(format!("{:?}", value)),
            name => self.push_extra(name, format_args!("{:?}", value)),
        }
    }
}
