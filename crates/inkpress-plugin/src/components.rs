//! Component registry: named UI extension points filled by plugins.
//!
//! A provider is either a ready descriptor or a deferred loader. Exactly
//! one provider exists per extension point; registering again replaces
//! the previous one, whoever owned it.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::PluginError;

/// What the rendering layer should mount for an extension point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDescriptor {
    /// Component identifier known to the rendering layer.
    pub component: String,
    /// Properties passed to the component.
    #[serde(default)]
    pub props: Value,
}

impl ComponentDescriptor {
    /// Creates a descriptor with the given component and props.
    pub fn new(component: impl Into<String>, props: Value) -> Self {
        Self {
            component: component.into(),
            props,
        }
    }
}

type LoadFn = Arc<dyn Fn() -> BoxFuture<'static, anyhow::Result<ComponentDescriptor>> + Send + Sync>;

/// A provider that produces its descriptor on demand.
///
/// Every [`DeferredComponent::load`] invokes the loader again; nothing is
/// cached here.
#[derive(Clone)]
pub struct DeferredComponent {
    /// Extension point this loader is registered under.
    point: String,
    /// Loader.
    loader: LoadFn,
}

impl std::fmt::Debug for DeferredComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeferredComponent")
            .field("point", &self.point)
            .field("loader", &"<closure>")
            .finish()
    }
}

impl DeferredComponent {
    /// Wraps an async loader.
    pub fn new<F, Fut>(loader: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<ComponentDescriptor>> + Send + 'static,
    {
        Self {
            point: String::new(),
            loader: Arc::new(move || Box::pin(loader())),
        }
    }

    /// The extension point this loader was registered under.
    pub fn point(&self) -> &str {
        &self.point
    }

    /// Runs the loader.
    pub async fn load(&self) -> Result<ComponentDescriptor, PluginError> {
        (self.loader)()
            .await
            .map_err(|e| PluginError::ComponentResolutionFailure {
                point: self.point.clone(),
                cause: format!("{e:#}"),
            })
    }

    /// Runs the loader, giving up after `timeout`.
    pub async fn load_within(&self, timeout: Duration) -> Result<ComponentDescriptor, PluginError> {
        match tokio::time::timeout(timeout, self.load()).await {
            Ok(result) => result,
            Err(_) => Err(PluginError::ComponentResolutionFailure {
                point: self.point.clone(),
                cause: format!("timed out after {} ms", timeout.as_millis()),
            }),
        }
    }
}

/// A provider registered for an extension point.
#[derive(Debug, Clone)]
pub enum ComponentProvider {
    /// Immediately usable descriptor.
    Ready(ComponentDescriptor),
    /// Descriptor produced asynchronously on each resolution.
    Deferred(DeferredComponent),
}

impl ComponentProvider {
    fn bound_to(self, point: &str) -> Self {
        match self {
            Self::Deferred(mut deferred) => {
                deferred.point = point.to_string();
                Self::Deferred(deferred)
            }
            ready => ready,
        }
    }
}

/// Outcome of resolving an extension point.
#[derive(Debug, Clone)]
pub enum Resolution {
    /// A ready descriptor.
    Ready(ComponentDescriptor),
    /// A deferred provider; show a placeholder while loading and a
    /// fallback if it fails.
    Deferred(DeferredComponent),
    /// Nothing is registered; render nothing.
    Absent,
}

impl Resolution {
    /// Whether nothing is registered.
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Turns the resolution into a descriptor, awaiting a deferred provider
    /// for at most `timeout`.
    pub async fn materialize(
        self,
        timeout: Duration,
    ) -> Result<Option<ComponentDescriptor>, PluginError> {
        match self {
            Self::Ready(descriptor) => Ok(Some(descriptor)),
            Self::Deferred(deferred) => deferred.load_within(timeout).await.map(Some),
            Self::Absent => Ok(None),
        }
    }
}

impl From<ComponentProvider> for Resolution {
    fn from(provider: ComponentProvider) -> Self {
        match provider {
            ComponentProvider::Ready(descriptor) => Self::Ready(descriptor),
            ComponentProvider::Deferred(deferred) => Self::Deferred(deferred),
        }
    }
}

/// Entry in the component registry.
#[derive(Debug, Clone)]
struct ComponentEntry {
    /// Plugin that registered the provider.
    owner: String,
    /// The provider.
    provider: ComponentProvider,
}

/// Registry of extension-point providers.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    /// Extension point → provider and owner.
    entries: RwLock<HashMap<String, ComponentEntry>>,
}

impl ComponentRegistry {
    /// Creates a new empty component registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Associates `provider` with `point`, replacing any previous provider.
    ///
    /// Returns the previous owner, if there was one.
    pub async fn register_component(
        &self,
        plugin: &str,
        point: &str,
        provider: ComponentProvider,
    ) -> Option<String> {
        let entry = ComponentEntry {
            owner: plugin.to_string(),
            provider: provider.bound_to(point),
        };

        let previous = self
            .entries
            .write()
            .await
            .insert(point.to_string(), entry)
            .map(|e| e.owner);

        match &previous {
            Some(owner) if owner != plugin => info!(
                point = %point,
                plugin = %plugin,
                previous_owner = %owner,
                "Component provider replaced"
            ),
            _ => debug!(point = %point, plugin = %plugin, "Component provider registered"),
        }

        previous
    }

    /// Returns the provider for `point`, or [`Resolution::Absent`].
    pub async fn resolve(&self, point: &str) -> Resolution {
        self.lookup(point)
            .await
            .map(|(_, provider)| provider.into())
            .unwrap_or(Resolution::Absent)
    }

    /// Returns the owner and provider for `point`.
    pub async fn lookup(&self, point: &str) -> Option<(String, ComponentProvider)> {
        let entries = self.entries.read().await;
        entries
            .get(point)
            .map(|e| (e.owner.clone(), e.provider.clone()))
    }

    /// Removes every provider owned by `plugin`, returning the freed points.
    pub async fn unregister_plugin(&self, plugin: &str) -> Vec<String> {
        let mut entries = self.entries.write().await;
        let mut removed: Vec<String> = entries
            .iter()
            .filter(|(_, e)| e.owner == plugin)
            .map(|(point, _)| point.clone())
            .collect();

        for point in &removed {
            entries.remove(point);
        }
        removed.sort();

        if !removed.is_empty() {
            info!(plugin = %plugin, points = ?removed, "Component providers unregistered");
        }
        removed
    }

    /// Drops every provider owned by `plugin` and registers `providers`
    /// in its name, under one write guard. A point owned by another plugin
    /// is taken over, as with [`Self::register_component`].
    pub async fn replace_plugin(&self, plugin: &str, providers: Vec<(String, ComponentProvider)>) {
        let mut entries = self.entries.write().await;
        entries.retain(|_, e| e.owner != plugin);
        for (point, provider) in providers {
            let entry = ComponentEntry {
                owner: plugin.to_string(),
                provider: provider.bound_to(&point),
            };
            if let Some(previous) = entries.insert(point.clone(), entry) {
                info!(
                    point = %point,
                    plugin = %plugin,
                    previous_owner = %previous.owner,
                    "Component provider replaced"
                );
            }
        }
    }

    /// Returns the points currently owned by `plugin`, sorted.
    pub async fn points_owned_by(&self, plugin: &str) -> Vec<String> {
        let entries = self.entries.read().await;
        let mut points: Vec<String> = entries
            .iter()
            .filter(|(_, e)| e.owner == plugin)
            .map(|(point, _)| point.clone())
            .collect();
        points.sort();
        points
    }
}
