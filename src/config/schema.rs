//! Configuration schema definitions.
//!
//! The settings file has a single top-level `env` table. Every field is
//! optional; anything missing falls back to an empty string or empty list.

use serde::{Deserialize, Serialize};

/// Output-mode tags in `printType` that enable the file sink.
const FILE_PRINT_TAGS: [&str; 2] = ["f", "file"];

/// Root of the settings document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Runtime environment metadata.
    pub env: Settings,
}

/// Environment settings consumed by the logger factory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// System name, first component of the log file name.
    pub system: String,

    /// Deployment area.
    pub area: String,

    /// Service group.
    pub group: String,

    /// Log category, e.g. "app" or "access".
    pub log_type: String,

    /// Host label. Carried for completeness; not rendered.
    pub host: String,

    /// Minimum severity (trace, debug, info, warn, error, fatal).
    pub level: String,

    /// Output modes, e.g. `["console", "file"]`.
    pub print_type: Vec<String>,

    /// Directory prefix for the log file, including the trailing separator.
    pub file_path: String,

    /// Name of the environment variable holding the pod name.
    pub pod: String,

    /// Tag embedded in every log line.
    pub gid: String,
}

impl Settings {
    /// Returns true when `printType` requests file output.
    pub fn prints_to_file(&self) -> bool {
        self.print_type.iter().any(|tag| {
            FILE_PRINT_TAGS
                .iter()
                .any(|file_tag| tag.trim().eq_ignore_ascii_case(file_tag))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_camel_case_fields() {
        let yaml = r#"
env:
  system: pay
  area: kr
  group: api
  logType: app
  host: node-1
  level: WARN
  printType: [console, f]
  filePath: /var/log/
  pod: POD_NAME
  gid: g-01
"#;
        let config: Config = serde_yml::from_str(yaml).unwrap();
        let env = config.env;
        assert_eq!(env.system, "pay");
        assert_eq!(env.log_type, "app");
        assert_eq!(env.file_path, "/var/log/");
        assert_eq!(env.print_type, vec!["console", "f"]);
        assert_eq!(env.gid, "g-01");
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let config: Config = serde_yml::from_str("env:\n  level: debug\n").unwrap();
        assert_eq!(config.env.level, "debug");
        assert!(config.env.system.is_empty());
        assert!(config.env.print_type.is_empty());
    }

    #[test]
    fn test_prints_to_file() {
        let mut settings = Settings::default();
        assert!(!settings.prints_to_file());

        settings.print_type = vec!["console".into()];
        assert!(!settings.prints_to_file());

        settings.print_type = vec!["console".into(), "F".into()];
        assert!(settings.prints_to_file());

        settings.print_type = vec!["file".into()];
        assert!(settings.prints_to_file());
    }
}
