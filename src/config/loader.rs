//! Configuration loading from disk.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use serde_yml::Value;
use thiserror::Error;

use crate::config::schema::{Config, Settings};

/// Settings file name, relative to the working directory.
pub const CONFIG_FILE_NAME: &str = "setting-local.yml";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The settings file exists but could not be read, or could not be created.
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    /// The settings file is not valid YAML for the schema.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_yml::Error),

    /// One `env` field has the wrong type. The other fields still load.
    #[error("Parse error: env.{field}: {source}")]
    Field {
        field: String,
        #[source]
        source: serde_yml::Error,
    },
}

/// Load settings from a YAML file.
///
/// A missing file is created empty and yields default settings. An empty
/// file (or one holding only comments) also yields default settings.
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    match read_settings_file(path)? {
        Some(content) => parse_settings(&content),
        None => Ok(Settings::default()),
    }
}

/// Parse settings from YAML text. Fails on the first bad field.
pub fn parse_settings(content: &str) -> Result<Settings, ConfigError> {
    match parse_settings_partial(content) {
        (settings, None) => Ok(settings),
        (_, Some(e)) => Err(e),
    }
}

/// Parse settings from YAML text, keeping every field that decodes.
///
/// Each `env` entry is decoded on its own; a mistyped entry keeps its
/// default and the first such error is returned alongside the settings.
pub fn parse_settings_partial(content: &str) -> (Settings, Option<ConfigError>) {
    let mut settings = Settings::default();
    if is_blank_document(content) {
        return (settings, None);
    }

    let root: Value = match serde_yml::from_str(content) {
        Ok(root) => root,
        Err(e) => return (settings, Some(ConfigError::Parse(e))),
    };
    let env = match root.get("env") {
        Some(Value::Mapping(env)) => env,
        Some(Value::Null) => return (settings, None),
        _ => {
            // Not a mapping with an `env` table: let serde report the shape.
            let err = serde_yml::from_value::<Config>(root.clone()).err().map(ConfigError::Parse);
            return (settings, err);
        }
    };

    let mut first_error = None;
    for (key, value) in env {
        let Some(field) = key.as_str() else { continue };
        if let Err(source) = apply_field(&mut settings, field, value.clone()) {
            first_error.get_or_insert(ConfigError::Field {
                field: field.to_string(),
                source,
            });
        }
    }
    (settings, first_error)
}

fn apply_field(settings: &mut Settings, field: &str, value: Value) -> Result<(), serde_yml::Error> {
    if value.is_null() {
        return Ok(());
    }
    match field {
        "system" => settings.system = serde_yml::from_value(value)?,
        "area" => settings.area = serde_yml::from_value(value)?,
        "group" => settings.group = serde_yml::from_value(value)?,
        "logType" => settings.log_type = serde_yml::from_value(value)?,
        "host" => settings.host = serde_yml::from_value(value)?,
        "level" => settings.level = serde_yml::from_value(value)?,
        "printType" => settings.print_type = serde_yml::from_value(value)?,
        "filePath" => settings.file_path = serde_yml::from_value(value)?,
        "pod" => settings.pod = serde_yml::from_value(value)?,
        "gid" => settings.gid = serde_yml::from_value(value)?,
        _ => {}
    }
    Ok(())
}

/// Load settings, keeping whatever decodes and defaulting the rest.
///
/// The error is printed to stdout (no subscriber exists yet at this point)
/// and handed back so the caller can report it again through the logger.
pub fn load_settings_or_default(path: &Path) -> (Settings, Option<ConfigError>) {
    let (settings, err) = match read_settings_file(path) {
        Ok(Some(content)) => parse_settings_partial(&content),
        Ok(None) => (Settings::default(), None),
        Err(e) => (Settings::default(), Some(e)),
    };
    if let Some(e) = &err {
        println!("load_settings error: {}", e);
    }
    (settings, err)
}

/// Read the settings file. `None` means it was missing and has been created.
fn read_settings_file(path: &Path) -> Result<Option<String>, ConfigError> {
    let io_err = |source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    };

    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            File::create(path).map_err(io_err)?;
            return Ok(None);
        }
        Err(e) => return Err(io_err(e)),
    };

    let mut content = String::new();
    file.read_to_string(&mut content).map_err(io_err)?;
    Ok(Some(content))
}

/// Serialize settings back to YAML under the `env` key.
pub fn render_settings(settings: &Settings) -> Result<String, ConfigError> {
    let config = Config {
        env: settings.clone(),
    };
    Ok(serde_yml::to_string(&config)?)
}

fn is_blank_document(content: &str) -> bool {
    content.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#') || line == "---"
    })
}
