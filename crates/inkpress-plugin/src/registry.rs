//! Plugin registry: stores plugin instances and descriptors in registration order.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use crate::descriptor::{Plugin, PluginDescriptor};
use crate::error::PluginError;

#[derive(Debug, Default)]
struct RegistryInner {
    /// Plugin names in registration order.
    order: Vec<String>,
    /// Plugin name → plugin instance.
    plugins: HashMap<String, Arc<dyn Plugin>>,
    /// Plugin name → descriptor captured at registration.
    metadata: HashMap<String, PluginDescriptor>,
}

/// Registry of all registered plugins.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    inner: RwLock<RegistryInner>,
}

impl PluginRegistry {
    /// Creates a new empty plugin registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a plugin, returning its descriptor.
    pub async fn register(&self, plugin: Arc<dyn Plugin>) -> Result<PluginDescriptor, PluginError> {
        let descriptor = plugin.descriptor();
        let name = descriptor.name.clone();

        if name.trim().is_empty() {
            return Err(PluginError::InvalidDescriptor(
                "plugin name must not be empty".to_string(),
            ));
        }

        let mut inner = self.inner.write().await;
        if inner.plugins.contains_key(&name) {
            return Err(PluginError::DuplicateName(name));
        }

        info!(
            plugin = %name,
            version = %descriptor.version,
            dependencies = ?descriptor.dependencies,
            "Registering plugin"
        );

        inner.order.push(name.clone());
        inner.plugins.insert(name.clone(), plugin);
        inner.metadata.insert(name, descriptor.clone());

        Ok(descriptor)
    }

    /// Unregisters a plugin by name.
    pub async fn unregister(&self, name: &str) -> Result<Arc<dyn Plugin>, PluginError> {
        let mut inner = self.inner.write().await;

        let plugin = inner
            .plugins
            .remove(name)
            .ok_or_else(|| PluginError::PluginNotFound(name.to_string()))?;

        inner.metadata.remove(name);
        inner.order.retain(|n| n != name);

        Ok(plugin)
    }

    /// Gets a plugin instance by name.
    pub async fn get(&self, name: &str) -> Option<Arc<dyn Plugin>> {
        self.inner.read().await.plugins.get(name).cloned()
    }

    /// Gets a plugin descriptor by name.
    pub async fn descriptor(&self, name: &str) -> Option<PluginDescriptor> {
        self.inner.read().await.metadata.get(name).cloned()
    }

    /// Lists all descriptors in registration order.
    pub async fn descriptors(&self) -> Vec<PluginDescriptor> {
        let inner = self.inner.read().await;
        inner
            .order
            .iter()
            .filter_map(|name| inner.metadata.get(name).cloned())
            .collect()
    }

    /// Returns plugin names in registration order.
    pub async fn names(&self) -> Vec<String> {
        self.inner.read().await.order.clone()
    }

    /// Returns plugin count.
    pub async fn count(&self) -> usize {
        self.inner.read().await.plugins.len()
    }

    /// Checks whether a plugin is registered.
    pub async fn contains(&self, name: &str) -> bool {
        self.inner.read().await.plugins.contains_key(name)
    }

    /// Returns every registered plugin that depends on `name`, directly or
    /// transitively, in registration order.
    pub async fn dependents_of(&self, name: &str) -> Vec<String> {
        let inner = self.inner.read().await;
        let mut affected = vec![name.to_string()];
        let mut changed = true;

        while changed {
            changed = false;
            for candidate in &inner.order {
                if affected.contains(candidate) {
                    continue;
                }
                let depends = inner
                    .metadata
                    .get(candidate)
                    .is_some_and(|d| affected.iter().any(|a| d.depends_on(a)));
                if depends {
                    affected.push(candidate.clone());
                    changed = true;
                }
            }
        }

        inner
            .order
            .iter()
            .filter(|n| *n != name && affected.contains(n))
            .cloned()
            .collect()
    }
}
