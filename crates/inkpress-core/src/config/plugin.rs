//! Plugin system configuration.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Plugin runtime configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginSystemConfig {
    /// Upper bound for one plugin initializer, in milliseconds.
    #[serde(default = "default_init_timeout")]
    pub init_timeout_ms: u64,
    /// Upper bound for one transform hook invocation, in milliseconds.
    #[serde(default = "default_hook_timeout")]
    pub hook_timeout_ms: u64,
    /// Upper bound callers should apply to deferred component providers.
    #[serde(default = "default_component_timeout")]
    pub component_timeout_ms: u64,
    /// Per-plugin deployment overrides, keyed by plugin name.
    #[serde(default)]
    pub entries: HashMap<String, PluginEntryConfig>,
}

impl PluginSystemConfig {
    /// Initializer time budget.
    pub fn init_timeout(&self) -> Duration {
        Duration::from_millis(self.init_timeout_ms)
    }

    /// Transform hook time budget.
    pub fn hook_timeout(&self) -> Duration {
        Duration::from_millis(self.hook_timeout_ms)
    }

    /// Deferred component time budget.
    pub fn component_timeout(&self) -> Duration {
        Duration::from_millis(self.component_timeout_ms)
    }

    /// Returns the deployment override for a plugin, if any.
    pub fn entry(&self, name: &str) -> Option<&PluginEntryConfig> {
        self.entries.get(name)
    }
}

impl Default for PluginSystemConfig {
    fn default() -> Self {
        Self {
            init_timeout_ms: default_init_timeout(),
            hook_timeout_ms: default_hook_timeout(),
            component_timeout_ms: default_component_timeout(),
            entries: HashMap::new(),
        }
    }
}

/// Deployment override for a single plugin.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PluginEntryConfig {
    /// Initial enabled flag; `None` keeps the runtime default (enabled).
    #[serde(default)]
    pub enabled: Option<bool>,
    /// Replaces the plugin's built-in configuration when present.
    #[serde(default)]
    pub config: Option<Value>,
}

fn default_init_timeout() -> u64 {
    5_000
}

fn default_hook_timeout() -> u64 {
    2_000
}

fn default_component_timeout() -> u64 {
    3_000
}
