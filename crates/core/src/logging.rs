//! Logging initialization.
//!
//! Logs go to stderr unless `logging.file` is set in `config.toml`, in which
//! case they are appended to that file through a non-blocking writer.

use anyhow::{Context, Result};
use bt_protocol::config_models::LoggingConfig;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Result of logging initialization
pub struct LoggingHandle {
    /// Guard that must be kept alive for the duration of the program.
    /// When dropped, ensures all buffered logs are flushed.
    pub _guard: Option<WorkerGuard>,

    /// Path to the log file, when logging to a file.
    pub log_file_path: Option<PathBuf>,
}

/// Initialize the global tracing subscriber.
///
/// # Arguments
/// * `config` - Logging section of the global configuration
/// * `debug_override` - If true, use "debug" instead of the configured level
///
/// `RUST_LOG` takes precedence over both.
pub fn init_logging(config: &LoggingConfig, debug_override: bool) -> Result<LoggingHandle> {
    let directive = std::env::var("RUST_LOG").unwrap_or_else(|_| log_level(config, debug_override));
    let filter = EnvFilter::try_new(&directive)
        .with_context(|| format!("Invalid log filter '{directive}'"))?;

    match &config.file {
        Some(path) => {
            let (dir, file_name) = split_log_path(path)?;
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

            let file_appender = tracing_appender::rolling::never(&dir, &file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(false)
                        .with_ansi(false)
                        .with_writer(non_blocking),
                )
                .try_init()
                .context("Failed to install tracing subscriber")?;

            Ok(LoggingHandle {
                _guard: Some(guard),
                log_file_path: Some(dir.join(file_name)),
            })
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(false)
                        .with_writer(std::io::stderr),
                )
                .try_init()
                .context("Failed to install tracing subscriber")?;

            Ok(LoggingHandle {
                _guard: None,
                log_file_path: None,
            })
        }
    }
}

fn log_level(config: &LoggingConfig, debug_override: bool) -> String {
    if debug_override {
        "debug".to_string()
    } else {
        config.level.clone()
    }
}

/// Split a log file path into its directory and file name.
///
/// A bare file name resolves against the current directory.
fn split_log_path(path: &Path) -> Result<(PathBuf, String)> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("Log file path {} has no file name", path.display()))?
        .to_string();

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    Ok((dir, file_name))
}
