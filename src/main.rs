//! common-log command line tool.
//!
//! Loads `setting-local.yml` (or `--config`), builds the logger exactly as a
//! service would, and emits messages through it. Handy for checking what a
//! settings file produces on the console and in the log file.
//!
//! ```text
//! common-log log --level warn "disk almost full"
//! common-log --config deploy/setting-prod.yml show-config
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use common_log::config::{load_settings_or_default, loader::render_settings, CONFIG_FILE_NAME};
use common_log::observability::{LoggerBuilder, Severity};

#[derive(Parser)]
#[command(name = "common-log")]
#[command(about = "Emit log lines through the configured console/file sinks", long_about = None)]
struct Cli {
    /// Settings file (created empty if missing).
    #[arg(short, long, default_value = CONFIG_FILE_NAME)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log each message at the given severity
    Log {
        /// trace, debug, info, warn, error or fatal
        #[arg(short, long, default_value = "info")]
        level: Severity,

        #[arg(required = true)]
        messages: Vec<String>,
    },
    /// Print the effective settings as YAML
    ShowConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let (settings, config_error) = load_settings_or_default(&cli.config);

    match cli.command {
        Commands::ShowConfig => {
            print!("{}", render_settings(&settings)?);
        }
        Commands::Log { level, messages } => {
            let logger = LoggerBuilder::new(settings).build_or_console();
            if let Some(e) = config_error {
                logger.warn(&format!("using default settings: {}", e));
            }
            for message in &messages {
                match level {
                    Severity::Fatal => logger.fatal(message),
                    other => logger.log(other, message),
                }
            }
            logger.shutdown()?;
        }
    }

    Ok(())
}
