//! Configuration models that aggregate all settings.

use bt_protocol::config_models::GlobalConfig;
use bt_protocol::routing_models::Routing;

/// Unified application configuration loaded from the `.batch-tracker/`
/// directory.
///
/// - `config.toml`: Global settings
/// - `routings/*.yaml`: Routing definitions, sorted by file name
///
/// # Example
///
/// ```rust,no_run
/// use bt_core::config::loader::load_config;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new(".")).await?;
/// println!("Loaded {} routings", config.routings.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Global settings from `config.toml`.
    pub global: GlobalConfig,

    /// All routings loaded from `routings/*.yaml`.
    pub routings: Vec<Routing>,
}

impl AppConfig {
    /// Look up a routing by name.
    pub fn routing(&self, name: &str) -> Option<&Routing> {
        self.routings.iter().find(|routing| routing.name == name)
    }

    pub fn routing_names(&self) -> Vec<&str> {
        self.routings.iter().map(|routing| routing.name.as_str()).collect()
    }
}
