//! Hook registry: transform hooks grouped by owning plugin.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info};

use inkpress_core::types::content::ContentItem;

/// Trait for content transform implementations.
#[async_trait]
pub trait TransformHook: Send + Sync + std::fmt::Debug {
    /// Short label used in logs.
    fn name(&self) -> &str {
        "transform"
    }

    /// Returns an enhanced copy of `item`.
    ///
    /// `config` is the owning plugin's effective configuration at the
    /// moment the pipeline run started.
    async fn transform(&self, item: ContentItem, config: &Value) -> anyhow::Result<ContentItem>;
}

/// Registry of transform hooks keyed by plugin name.
///
/// Hooks of one plugin run in the order they were registered. Ordering
/// across plugins is decided by the caller of the pipeline.
#[derive(Debug, Default)]
pub struct HookRegistry {
    /// Plugin name → hooks in registration order.
    handlers: RwLock<HashMap<String, Vec<Arc<dyn TransformHook>>>>,
}

impl HookRegistry {
    /// Creates a new empty hook registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a transform hook owned by `plugin`.
    pub async fn register(&self, plugin: &str, hook: Arc<dyn TransformHook>) {
        let mut handlers = self.handlers.write().await;
        debug!(plugin = %plugin, hook = %hook.name(), "Transform hook registered");
        handlers.entry(plugin.to_string()).or_default().push(hook);
    }

    /// Unregisters all hooks owned by `plugin`, returning how many were removed.
    pub async fn unregister_plugin(&self, plugin: &str) -> usize {
        let removed = self
            .handlers
            .write()
            .await
            .remove(plugin)
            .map(|hooks| hooks.len())
            .unwrap_or(0);

        if removed > 0 {
            info!(plugin = %plugin, removed, "Transform hooks unregistered");
        }
        removed
    }

    /// Replaces every hook owned by `plugin` under one write guard,
    /// returning how many were dropped.
    pub async fn replace_plugin(&self, plugin: &str, hooks: Vec<Arc<dyn TransformHook>>) -> usize {
        let mut handlers = self.handlers.write().await;
        let previous = if hooks.is_empty() {
            handlers.remove(plugin)
        } else {
            handlers.insert(plugin.to_string(), hooks)
        };
        let removed = previous.map(|hooks| hooks.len()).unwrap_or(0);
        debug!(plugin = %plugin, removed, "Transform hooks replaced");
        removed
    }

    /// Returns the hooks owned by `plugin`, in registration order.
    pub async fn get_hooks(&self, plugin: &str) -> Vec<Arc<dyn TransformHook>> {
        let handlers = self.handlers.read().await;
        handlers.get(plugin).cloned().unwrap_or_default()
    }

    /// Returns the number of hooks owned by `plugin`.
    pub async fn hook_count(&self, plugin: &str) -> usize {
        let handlers = self.handlers.read().await;
        handlers.get(plugin).map(Vec::len).unwrap_or(0)
    }
}
