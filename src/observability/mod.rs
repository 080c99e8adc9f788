//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Settings
//!     → logging.rs (LoggerBuilder: level, pod name, tag, file name)
//!     → tracing Dispatch
//!         ├─ console layer: format.rs (ConsoleFormat) → stderr
//!         └─ file layer:    envelope.rs (JSON envelope)
//!                             → file_sink.rs (decode, FileFormat) → <name>.log
//!
//! Call sites:
//!     → Logger::{trace, debug, info, warn, error, fatal}
//!     → global.rs free functions over one installed Logger
//! ```
//!
//! # Design Decisions
//! - One Logger per process, shared by clone; no runtime reconfiguration
//! - Console and file share one line layout through `LineFormat`
//! - The file name is bucketed by the hour at construction; no rotation

pub mod envelope;
pub mod file_sink;
pub mod format;
pub mod global;
pub mod level;
pub mod logging;

pub use file_sink::FileSink;
pub use format::{ConsoleFormat, FileFormat, FormatError, LineFormat, LogRecord};
pub use level::Severity;
pub use logging::{Logger, LoggerBuilder, LoggerError, DEFAULT_POD_NAME};
