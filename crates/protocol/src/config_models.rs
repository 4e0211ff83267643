//! Global configuration models for `.batch-tracker/config.toml`.
//!
//! This module defines the structure of the global configuration file that
//! controls the driver loop and logging.

use serde::Deserialize;
use serde::Serialize;
use std::path::PathBuf;
use ts_rs::TS;

/// Represents global settings from `.batch-tracker/config.toml`.
///
/// Every field has a default, so an empty or missing file is valid.
///
/// # Example
///
/// ```toml
/// # .batch-tracker/config.toml
/// poll_interval_secs = 2
/// transport = "redis"
/// redis_url = "redis://127.0.0.1:6379/"
/// queue_name = "operation_queue"
/// snapshot_buffer = 64
///
/// [logging]
/// level = "info"
/// file = "logfile.log"
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
pub struct GlobalConfig {
    /// Seconds between two engine cycles.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Where step-start messages are read from.
    #[serde(default)]
    pub transport: TransportKind,

    /// Connection URL used by the Redis transport.
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// Name of the Redis list carrying step-start messages.
    #[serde(default = "default_queue_name")]
    pub queue_name: String,

    /// Capacity of the channel between the engine and its event sink.
    #[serde(default = "default_snapshot_buffer")]
    pub snapshot_buffer: usize,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            transport: TransportKind::default(),
            redis_url: default_redis_url(),
            queue_name: default_queue_name(),
            snapshot_buffer: default_snapshot_buffer(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Message transport selection.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, TS)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// JSON lines on standard input.
    #[default]
    Stdin,

    /// A Redis list, pushed with LPUSH by producers and drained with RPOP.
    Redis,
}

/// Logging settings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Write logs to this file instead of stderr.
    #[serde(default)]
    #[ts(type = "string | null")]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_poll_interval_secs() -> u64 {
    2
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379/".to_string()
}

fn default_queue_name() -> String {
    "operation_queue".to_string()
}

fn default_snapshot_buffer() -> usize {
    64
}

fn default_log_level() -> String {
    "info".to_string()
}
