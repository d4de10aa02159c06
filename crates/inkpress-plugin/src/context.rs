//! Plugin context: what a plugin sees and contributes while initializing.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::components::ComponentProvider;
use crate::config::parse_config;
use crate::hooks::registry::TransformHook;

/// Summary of what a plugin contributed, for listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookSummary {
    /// Number of transform hooks.
    pub transforms: usize,
    /// Extension points the plugin currently provides, sorted.
    pub components: Vec<String>,
}

/// Passed to [`crate::Plugin::initialize`].
///
/// Contributions are staged here and committed by the manager only after
/// the initializer succeeds.
#[derive(Debug)]
pub struct PluginContext {
    /// Name of the plugin being initialized.
    plugin: String,
    /// Effective configuration.
    config: Value,
    /// Staged transform hooks.
    transforms: Vec<Arc<dyn TransformHook>>,
    /// Staged component providers.
    components: Vec<(String, ComponentProvider)>,
}

impl PluginContext {
    /// Creates a context for `plugin` with its effective configuration.
    pub fn new(plugin: &str, config: Value) -> Self {
        Self {
            plugin: plugin.to_string(),
            config,
            transforms: Vec::new(),
            components: Vec::new(),
        }
    }

    /// Name of the plugin being initialized.
    pub fn plugin_name(&self) -> &str {
        &self.plugin
    }

    /// Effective configuration.
    pub fn config(&self) -> &Value {
        &self.config
    }

    /// Deserializes the effective configuration with [`parse_config`].
    pub fn config_as<T: DeserializeOwned>(&self) -> anyhow::Result<T> {
        parse_config(&self.config)
            .map_err(|e| anyhow::anyhow!("invalid configuration for '{}': {e:#}", self.plugin))
    }

    /// Contributes a content transform.
    pub fn add_transform(&mut self, hook: impl TransformHook + 'static) {
        self.transforms.push(Arc::new(hook));
    }

    /// Contributes a provider for an extension point.
    pub fn provide_component(&mut self, point: &str, provider: ComponentProvider) {
        self.components.push((point.to_string(), provider));
    }

    /// Number of transforms contributed so far.
    pub fn transform_count(&self) -> usize {
        self.transforms.len()
    }

    /// The provider contributed for `point`, if any. A later contribution
    /// for the same point replaces an earlier one.
    pub fn provided(&self, point: &str) -> Option<&ComponentProvider> {
        self.components
            .iter()
            .rev()
            .find(|(p, _)| p == point)
            .map(|(_, provider)| provider)
    }

    /// Splits the context into its staged contributions.
    pub(crate) fn into_parts(self) -> (Vec<Arc<dyn TransformHook>>, Vec<(String, ComponentProvider)>) {
        (self.transforms, self.components)
    }
}
