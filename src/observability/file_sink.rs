//! Log file sink.
//!
//! Receives envelope lines from [`EnvelopeFormat`](super::envelope::EnvelopeFormat),
//! unpacks them and appends the rendered text to the log file. A whole
//! write is rendered first and appended under the lock in one call, so
//! lines from concurrent events never interleave.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing_subscriber::fmt::MakeWriter;

use crate::observability::envelope;
use crate::observability::format::FileFormat;

/// Shared handle to an open log file.
#[derive(Debug, Clone)]
pub struct FileSink {
    inner: Arc<FileSinkInner>,
}

#[derive(Debug)]
struct FileSinkInner {
    path: PathBuf,
    file: Mutex<File>,
    format: FileFormat,
}

impl FileSink {
    /// Open (create or append) the file at `path`.
    pub fn open(path: impl Into<PathBuf>, format: FileFormat) -> io::Result<Self> {
        let path = path.into();
        let mut options = OpenOptions::new();
        options.create(true).append(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o664);
        }
        let file = options.open(&path)?;

        Ok(Self {
            inner: Arc::new(FileSinkInner {
                path,
                file: Mutex::new(file),
                format,
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Decode every envelope line in `buf` and append the rendered lines.
    ///
    /// Returns `InvalidData` if any line is malformed; nothing is written then.
    pub fn write_envelopes(&self, buf: &[u8]) -> io::Result<usize> {
        let mut rendered = String::new();
        for line in buf.split(|b| *b == b'\n') {
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            let record = envelope::decode(line)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            let text = self
                .inner
                .format
                .render_line(&record.as_record())
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            rendered.push_str(&text);
        }

        if !rendered.is_empty() {
            let mut file = self.lock()?;
            file.write_all(rendered.as_bytes())?;
        }
        Ok(buf.len())
    }

    pub fn flush(&self) -> io::Result<()> {
        self.lock()?.flush()
    }

    fn lock(&self) -> io::Result<std::sync::MutexGuard<'_, File>> {
        self.inner
            .file
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))
    }
}

/// Per-event writer borrowed from a [`FileSink`].
#[derive(Debug)]
pub struct FileSinkWriter<'a> {
    sink: &'a FileSink,
}

impl Write for FileSinkWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.sink.write_envelopes(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.sink.flush()
    }
}

impl<'a> MakeWriter<'a> for FileSink {
    type Writer = FileSinkWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        FileSinkWriter { sink: self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::envelope::{encode, InnerRecord};

    fn line(message: &str) -> String {
        let record = InnerRecord {
            level: "error".into(),
            time: "2024-02-03T04:05:06+00:00".into(),
            caller: "src/db/pool.rs:7".into(),
            message: message.into(),
        };
        format!("{}\n", encode("g-9", &record).unwrap())
    }

    #[test]
    fn test_write_renders_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let sink = FileSink::open(&path, FileFormat::new("g-9")).unwrap();

        let first = line("pool exhausted");
        let n = sink.make_writer().write(first.as_bytes()).unwrap();
        assert_eq!(n, first.len());
        sink.make_writer().write_all(line("recovered").as_bytes()).unwrap();
        sink.flush().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "24-02-03 04:05:06 ERROR pool.rs:7 [[[((g-9)) pool exhausted ]]]\n\
             24-02-03 04:05:06 ERROR pool.rs:7 [[[((g-9)) recovered ]]]\n"
        );
    }

    #[test]
    fn test_malformed_envelope_is_invalid_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let sink = FileSink::open(&path, FileFormat::new("g")).unwrap();

        let err = sink.make_writer().write(b"{broken\n").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_open_appends_to_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, "earlier\n").unwrap();

        let sink = FileSink::open(&path, FileFormat::new("g-9")).unwrap();
        sink.write_envelopes(line("later").as_bytes()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("earlier\n"));
        assert!(content.ends_with("[[[((g-9)) later ]]]\n"));
    }
}
