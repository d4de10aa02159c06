//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from
//! an optional TOML file overlaid with `INKPRESS__`-prefixed environment
//! variables. Every section has defaults, so an empty source is valid.

pub mod content;
pub mod logging;
pub mod plugin;

use serde::{Deserialize, Serialize};

pub use self::content::ContentConfig;
pub use self::logging::LoggingConfig;
pub use self::plugin::{PluginEntryConfig, PluginSystemConfig};

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Plugin runtime settings.
    #[serde(default)]
    pub plugins: PluginSystemConfig,
    /// Content provider settings.
    #[serde(default)]
    pub content: ContentConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file and the environment.
    ///
    /// The file is optional. Environment variables use the `INKPRESS`
    /// prefix and `__` as the section separator, e.g.
    /// `INKPRESS__PLUGINS__HOOK_TIMEOUT_MS=500`.
    pub fn load(path: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("INKPRESS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
