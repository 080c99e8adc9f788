//! JSON wire form handed to the file sink.
//!
//! Each event becomes one line: an outer envelope whose `message` is itself
//! a JSON-encoded [`InnerRecord`].
//!
//! ```text
//! {"time":"2024-05-01T13:07:42+09:00","key":"g-01","message":"{\"level\":\"info\",...}"}
//! ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

use crate::observability::format::{EventFields, FormatError, LogRecord};

/// Outer envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub time: String,
    /// Origin tag. Older producers call this field `id`.
    #[serde(default, alias = "id")]
    pub key: String,
    /// JSON-encoded [`InnerRecord`].
    pub message: String,
}

/// Record nested inside [`Envelope::message`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InnerRecord {
    #[serde(default)]
    pub level: String,
    pub time: String,
    #[serde(default)]
    pub caller: String,
    #[serde(default)]
    pub message: String,
}

impl InnerRecord {
    pub fn as_record(&self) -> LogRecord<'_> {
        LogRecord {
            time: &self.time,
            level: &self.level,
            caller: &self.caller,
            message: &self.message,
        }
    }
}

/// Decode one envelope line down to its inner record.
pub fn decode(line: &[u8]) -> Result<InnerRecord, FormatError> {
    let envelope: Envelope = serde_json::from_slice(line).map_err(FormatError::Envelope)?;
    serde_json::from_str(&envelope.message).map_err(FormatError::Record)
}

/// Encode an inner record into one envelope line, without a newline.
pub fn encode(key: &str, record: &InnerRecord) -> serde_json::Result<String> {
    let envelope = Envelope {
        time: record.time.clone(),
        key: key.to_string(),
        message: serde_json::to_string(record)?,
    };
    serde_json::to_string(&envelope)
}

/// Event formatter producing envelope lines for the file sink.
#[derive(Debug, Clone)]
pub struct EnvelopeFormat {
    key: Arc<str>,
}

impl EnvelopeFormat {
    pub fn new(key: impl Into<Arc<str>>) -> Self {
        Self { key: key.into() }
    }
}

impl<S, N> FormatEvent<S, N> for EnvelopeFormat
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
        let metadata = event.metadata();
        let record = InnerRecord {
            level: fields.severity(metadata).as_str().to_string(),
            time: fields.time(),
            caller: fields.caller(metadata),
            message: fields.message,
        };
        let line = encode(&self.key, &record).map_err(|_| fmt::Error)?;
        writeln!(writer, "{}", line)
    }
}
