//! Shared utilities for integration and load testing.

use std::io;
use std::sync::{Arc, Mutex};

use common_log::Settings;
use tracing_subscriber::fmt::MakeWriter;

/// Pod variable name used by [`settings`].
pub const POD_VAR: &str = "POD_NAME";
/// Pod name returned by [`pod_lookup`].
pub const POD_NAME: &str = "api-7f9c";

/// In-memory console target.
#[derive(Clone, Default)]
pub struct CapturedConsole {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl CapturedConsole {
    pub fn text(&self) -> String {
        let buffer = self.buffer.lock().unwrap();
        String::from_utf8_lossy(&buffer).to_string()
    }

    #[allow(dead_code)]
    pub fn lines(&self) -> Vec<String> {
        self.text().lines().map(str::to_string).collect()
    }
}

impl io::Write for CapturedConsole {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer
            .lock()
            .map_err(|_| io::Error::other("Mutex poisoned"))?
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedConsole {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Resolves only [`POD_VAR`].
pub fn pod_lookup(name: &str) -> Option<String> {
    (name == POD_VAR).then(|| POD_NAME.to_string())
}

/// Settings with every naming field filled in.
pub fn settings(level: &str) -> Settings {
    Settings {
        system: "pay".into(),
        area: "kr".into(),
        group: "api".into(),
        log_type: "app".into(),
        host: "node-1".into(),
        level: level.into(),
        print_type: vec!["console".into()],
        pod: POD_VAR.into(),
        gid: "g-01".into(),
        ..Default::default()
    }
}

/// Split a rendered line into (time, level, caller, body).
#[allow(dead_code)]
pub fn split_line(line: &str) -> (&str, &str, &str, &str) {
    let (time, rest) = line.split_at(17);
    let mut parts = rest.trim_start().splitn(3, ' ');
    let level = parts.next().unwrap_or_default();
    let caller = parts.next().unwrap_or_default();
    let body = parts.next().unwrap_or_default();
    (time, level, caller, body)
}

/// Assert the `YY-MM-DD HH:MM:SS` prefix parses.
#[allow(dead_code)]
pub fn assert_display_time(time: &str) {
    chrono::NaiveDateTime::parse_from_str(time, "%y-%m-%d %H:%M:%S")
        .unwrap_or_else(|e| panic!("bad timestamp {time:?}: {e}"));
}
