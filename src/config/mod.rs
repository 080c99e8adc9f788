//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! setting-local.yml (YAML, top-level `env`)
//!     → loader.rs (read, create if missing, deserialize)
//!     → Settings (immutable for the process lifetime)
//!     → observability::LoggerBuilder
//! ```
//!
//! # Design Decisions
//! - Settings are read once at startup; there is no reload
//! - Every field has a default so an empty file is a valid config
//! - No semantic validation: an unknown level is resolved by the logger

pub mod loader;
pub mod schema;

pub use loader::{load_settings, load_settings_or_default, ConfigError, CONFIG_FILE_NAME};
pub use schema::{Config, Settings};
