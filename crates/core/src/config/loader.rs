//! Configuration file loader for the `.batch-tracker/` directory structure.
//!
//! This module loads and parses every configuration file under
//! `.batch-tracker/`:
//! - `config.toml`: Global settings
//! - `routings/*.yaml`: Routing definitions

use crate::config::error::ConfigError;
use crate::config::error::ConfigResult;
use crate::config::models::AppConfig;
use crate::sequence::validate_routing;
use bt_protocol::config_models::GlobalConfig;
use bt_protocol::routing_models::Routing;
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Name of the configuration directory under the project root.
pub const CONFIG_DIR: &str = ".batch-tracker";

/// Loads all configuration from the `.batch-tracker/` directory.
///
/// # Arguments
///
/// * `root` - Root directory containing the `.batch-tracker/` folder
///
/// # Returns
///
/// An `AppConfig` containing all loaded configuration. Missing directories
/// or files yield defaults rather than an error.
///
/// # Errors
///
/// Returns `ConfigError` if:
/// - Files exist but cannot be read
/// - Files have invalid TOML or YAML syntax
/// - A routing has duplicate step names or non-positive durations
/// - Two routing files share a name
///
/// # Example
///
/// ```rust,no_run
/// use bt_core::config::loader::load_config;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new(".")).await?;
/// println!("Polling every {}s", config.global.poll_interval_secs);
/// # Ok(())
/// # }
/// ```
pub async fn load_config(root: &Path) -> ConfigResult<AppConfig> {
    let bt_dir = root.join(CONFIG_DIR);

    if !bt_dir.exists() {
        debug!(path = %bt_dir.display(), "No config directory, using defaults");
        return Ok(AppConfig::default());
    }

    let global = load_global_config(&bt_dir)?;
    let routings = load_routings(&bt_dir)?;

    Ok(AppConfig { global, routings })
}

/// Loads global configuration from `config.toml`.
fn load_global_config(bt_dir: &Path) -> ConfigResult<GlobalConfig> {
    let config_path = bt_dir.join("config.toml");

    if !config_path.exists() {
        return Ok(GlobalConfig::default());
    }

    let content =
        std::fs::read_to_string(&config_path).map_err(|source| ConfigError::FileRead {
            path: config_path.clone(),
            source,
        })?;

    toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
        path: config_path,
        source,
    })
}

/// Loads all routing definitions from `routings/*.yaml`.
fn load_routings(bt_dir: &Path) -> ConfigResult<Vec<Routing>> {
    let routings_dir = bt_dir.join("routings");

    if !routings_dir.exists() {
        return Ok(Vec::new());
    }

    let mut routings = Vec::new();
    let mut names = HashSet::new();

    for entry in WalkDir::new(&routings_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| ConfigError::DirectoryWalk {
            path: routings_dir.clone(),
            source,
        })?;

        let path = entry.path();

        let ext = path.extension().and_then(|s| s.to_str());
        if ext != Some("yaml") && ext != Some("yml") {
            continue;
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        let routing: Routing =
            serde_yaml::from_str(&content).map_err(|source| ConfigError::YamlParse {
                path: path.to_path_buf(),
                source,
            })?;

        validate_routing(&routing.steps).map_err(|source| ConfigError::InvalidRouting {
            path: path.to_path_buf(),
            source,
        })?;

        if !names.insert(routing.name.clone()) {
            return Err(ConfigError::DuplicateRouting {
                name: routing.name,
                path: path.to_path_buf(),
            });
        }

        debug!(routing = %routing.name, steps = routing.steps.len(), "Loaded routing");
        routings.push(routing);
    }

    Ok(routings)
}
