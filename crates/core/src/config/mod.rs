//! Configuration loading and management.
//!
//! This module loads the global settings and routing definitions from the
//! `.batch-tracker/` directory structure.

pub mod error;
pub mod loader;
pub mod models;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_config, CONFIG_DIR};
pub use models::AppConfig;
