//! Error types for configuration loading.
//!
//! This module defines all errors that can occur while reading the
//! `.batch-tracker/` directory.

use crate::sequence::RoutingError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read a configuration file from disk.
    #[error("Failed to read config file at {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to parse TOML configuration.
    #[error("Failed to parse TOML file at {path}: {source}")]
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Failed to parse a YAML routing.
    #[error("Failed to parse YAML file at {path}: {source}")]
    YamlParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// Failed to walk directory structure.
    #[error("Failed to traverse directory {path}: {source}")]
    DirectoryWalk {
        path: PathBuf,
        source: walkdir::Error,
    },

    /// A routing parsed but its steps are not usable.
    #[error("Invalid routing in {path}: {source}")]
    InvalidRouting {
        path: PathBuf,
        source: RoutingError,
    },

    /// Two routing files declare the same name.
    #[error("Routing '{name}' is defined more than once (second definition in {path})")]
    DuplicateRouting { name: String, path: PathBuf },
}

/// Type alias for Result with ConfigError.
pub type ConfigResult<T> = Result<T, ConfigError>;
