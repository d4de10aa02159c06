//! Plugin identity and the capability interface every plugin implements.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::PluginContext;

/// Static identity and metadata of a plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginDescriptor {
    /// Unique plugin name.
    pub name: String,
    /// Plugin version string (informational).
    pub version: String,
    /// Plugin description.
    #[serde(default)]
    pub description: String,
    /// Author or maintainer.
    #[serde(default)]
    pub author: String,
    /// Names of plugins that must be initialized before this one.
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Built-in configuration, used unless deployment config overrides it.
    #[serde(default)]
    pub config: Value,
}

impl PluginDescriptor {
    /// Creates a descriptor with no dependencies and a `null` config.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            description: String::new(),
            author: String::new(),
            dependencies: Vec::new(),
            config: Value::Null,
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Adds a dependency.
    pub fn with_dependency(mut self, name: impl Into<String>) -> Self {
        self.dependencies.push(name.into());
        self
    }

    /// Sets the built-in configuration.
    pub fn with_config(mut self, config: Value) -> Self {
        self.config = config;
        self
    }

    /// Whether this plugin declares a dependency on `name`.
    pub fn depends_on(&self, name: &str) -> bool {
        self.dependencies.iter().any(|d| d == name)
    }
}

/// Trait that all plugins implement.
///
/// Only [`Plugin::descriptor`] is required. A plugin that does not override
/// [`Plugin::initialize`] contributes nothing to the pipeline or the
/// component registry; transforms and component providers are handed to
/// the runtime through the [`PluginContext`] during initialization.
#[async_trait]
pub trait Plugin: Send + Sync + std::fmt::Debug {
    /// Returns the plugin's identity. Read once, at registration.
    fn descriptor(&self) -> PluginDescriptor;

    /// Called once the plugin's dependencies are ready.
    ///
    /// `ctx.config()` holds the effective configuration. Contributions made
    /// through `ctx` are committed only if this returns `Ok`.
    async fn initialize(&self, ctx: &mut PluginContext) -> anyhow::Result<()> {
        let _ = ctx;
        Ok(())
    }

    /// Checks a configuration value before it is used.
    ///
    /// Called after an administrative config update; a failure is recorded
    /// on the plugin's status but does not roll the update back.
    fn validate_config(&self, config: &Value) -> anyhow::Result<()> {
        let _ = config;
        Ok(())
    }

    /// Called when the plugin is unregistered.
    async fn shutdown(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
