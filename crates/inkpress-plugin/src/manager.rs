//! Plugin manager: registration, initialization, content enhancement and
//! runtime administration of plugins.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use inkpress_core::config::plugin::{PluginEntryConfig, PluginSystemConfig};
use inkpress_core::result::AppResult;
use inkpress_core::traits::content::ContentProvider;
use inkpress_core::types::content::ContentItem;

use crate::components::{ComponentRegistry, Resolution};
use crate::context::{HookSummary, PluginContext};
use crate::descriptor::{Plugin, PluginDescriptor};
use crate::error::PluginError;
use crate::hooks::pipeline::{HookPipeline, PipelineStage};
use crate::hooks::registry::HookRegistry;
use crate::registry::PluginRegistry;
use crate::resolver::resolve_order;
use crate::status::{PluginState, PluginStatus, StatusStore};

/// A plugin that did not reach `Ready` during [`PluginManager::initialize_all`].
#[derive(Debug, Clone, PartialEq)]
pub struct FailedPlugin {
    /// Plugin name.
    pub name: String,
    /// Why it failed.
    pub error: PluginError,
}

/// Outcome of one [`PluginManager::initialize_all`] pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InitReport {
    /// Resolved initialization order, which is also the pipeline order.
    pub order: Vec<String>,
    /// Plugins that are `Ready` after the pass, in order.
    pub ready: Vec<String>,
    /// Plugins that failed during the pass, in order.
    pub failed: Vec<FailedPlugin>,
}

impl InitReport {
    /// Whether every plugin is ready.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Listing entry combining identity, runtime state and contributions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginSummary {
    /// Static identity.
    pub descriptor: PluginDescriptor,
    /// Runtime status.
    pub status: PluginStatus,
    /// What the plugin contributed when it was initialized.
    pub hooks: HookSummary,
}

/// Owns every plugin table and exposes the operations the rest of the
/// application uses.
///
/// Mutations are serialized on one lock; reads (statuses, component
/// resolution, pipeline runs) only touch the individual tables.
#[derive(Debug)]
pub struct PluginManager {
    /// Timeouts and deployment overrides.
    settings: PluginSystemConfig,
    /// Source of raw posts.
    content: Arc<dyn ContentProvider>,
    /// Plugin instances and descriptors.
    plugin_registry: PluginRegistry,
    /// Enabled flag, config and lifecycle state per plugin. A status is
    /// written after its descriptor and removed before it.
    statuses: Arc<StatusStore>,
    /// Transform execution.
    pipeline: HookPipeline,
    /// Extension-point providers.
    components: ComponentRegistry,
    /// Order of the last successful resolution.
    order: RwLock<Vec<String>>,
    /// Serializes administrative mutations and initialization.
    mutation_lock: Mutex<()>,
}

impl PluginManager {
    /// Creates a manager reading posts from `content`.
    pub fn new(settings: PluginSystemConfig, content: Arc<dyn ContentProvider>) -> Self {
        let statuses = Arc::new(StatusStore::new());
        let pipeline = HookPipeline::new(
            Arc::new(HookRegistry::new()),
            Arc::clone(&statuses),
            settings.hook_timeout(),
        );

        Self {
            settings,
            content,
            plugin_registry: PluginRegistry::new(),
            statuses,
            pipeline,
            components: ComponentRegistry::new(),
            order: RwLock::new(Vec::new()),
            mutation_lock: Mutex::new(()),
        }
    }

    /// Registers a plugin, applying its deployment override if configured.
    pub async fn register(&self, plugin: Arc<dyn Plugin>) -> Result<PluginStatus, PluginError> {
        let name = plugin.descriptor().name;
        let entry = self.settings.entry(&name).cloned().unwrap_or_default();
        self.register_with(plugin, &entry).await
    }

    /// Registers a plugin with an explicit override.
    pub async fn register_with(
        &self,
        plugin: Arc<dyn Plugin>,
        entry: &PluginEntryConfig,
    ) -> Result<PluginStatus, PluginError> {
        let _guard = self.mutation_lock.lock().await;

        let descriptor = self.plugin_registry.register(plugin).await?;
        let enabled = entry.enabled.unwrap_or(true);
        let config = entry
            .config
            .clone()
            .unwrap_or_else(|| descriptor.config.clone());

        // The status is the commit point: readers treat a plugin as
        // registered once its status exists.
        let status = self.statuses.insert(&descriptor.name, enabled, config).await;
        info!(
            plugin = %descriptor.name,
            enabled,
            overridden = entry.config.is_some(),
            "Plugin registered"
        );
        Ok(status)
    }

    /// Resolves the dependency order and initializes every plugin that is
    /// not already `Ready`.
    ///
    /// Returns an error, changing nothing, when a dependency is missing or
    /// the graph has a cycle. Individual initialization failures are
    /// recorded on the plugins' statuses and listed in the report.
    pub async fn initialize_all(&self) -> Result<InitReport, PluginError> {
        let _guard = self.mutation_lock.lock().await;

        let descriptors = self.plugin_registry.descriptors().await;
        let order = resolve_order(&descriptors).map_err(|e| {
            error!(error = %e, "Plugin dependency resolution failed");
            e
        })?;

        info!(order = ?order, "Initializing plugins");

        let by_name: HashMap<&str, &PluginDescriptor> =
            descriptors.iter().map(|d| (d.name.as_str(), d)).collect();
        let mut report = InitReport {
            order: order.clone(),
            ..InitReport::default()
        };

        for name in &order {
            let Some(descriptor) = by_name.get(name.as_str()) else {
                continue;
            };
            let status = self.statuses.get(name).await?;
            if status.state == PluginState::Ready {
                report.ready.push(name.clone());
                continue;
            }

            match self.initialize_one(descriptor, status.config).await {
                Ok(()) => report.ready.push(name.clone()),
                Err(error) => report.failed.push(FailedPlugin {
                    name: name.clone(),
                    error,
                }),
            }
        }

        *self.order.write().await = order;

        info!(
            ready = report.ready.len(),
            failed = report.failed.len(),
            "Plugin initialization finished"
        );
        Ok(report)
    }

    async fn initialize_one(
        &self,
        descriptor: &PluginDescriptor,
        config: Value,
    ) -> Result<(), PluginError> {
        let name = descriptor.name.as_str();
        let plugin = self
            .plugin_registry
            .get(name)
            .await
            .ok_or_else(|| PluginError::PluginNotFound(name.to_string()))?;

        for dependency in &descriptor.dependencies {
            let ready = self
                .statuses
                .get(dependency)
                .await
                .is_ok_and(|s| s.state == PluginState::Ready);
            if !ready {
                let err = PluginError::InitializationFailure {
                    plugin: name.to_string(),
                    cause: format!("dependency '{dependency}' is not ready"),
                };
                warn!(plugin = %name, dependency = %dependency, "Skipping plugin, dependency not ready");
                self.statuses.mark_failed(name, &err).await?;
                return Err(err);
            }
        }

        self.statuses.set_state(name, PluginState::Initializing).await?;
        self.pipeline.unregister_plugin(name).await;
        self.components.unregister_plugin(name).await;

        match self.run_initializer(plugin.as_ref(), name, config).await {
            Ok(ctx) => {
                let (transforms, components) = self.commit(name, ctx).await;
                self.statuses.mark_ready(name).await?;
                info!(
                    plugin = %name,
                    version = %descriptor.version,
                    transforms,
                    components,
                    "Plugin initialized"
                );
                Ok(())
            }
            Err(err) => {
                warn!(plugin = %name, error = %err, "Plugin initialization failed");
                self.statuses.mark_failed(name, &err).await?;
                Err(err)
            }
        }
    }

    /// Rebuilds a `Ready` plugin's contributions from `config`.
    ///
    /// The plugin stays `Ready` while its initializer runs, so readers keep
    /// the previous contributions until the new ones are swapped in. On
    /// failure the plugin and its `Ready` dependents become `Failed` and the
    /// plugin keeps no contributions.
    async fn reinitialize(&self, name: &str, config: Value) -> Result<PluginStatus, PluginError> {
        let plugin = self
            .plugin_registry
            .get(name)
            .await
            .ok_or_else(|| PluginError::PluginNotFound(name.to_string()))?;

        match self.run_initializer(plugin.as_ref(), name, config).await {
            Ok(ctx) => {
                let (transforms, components) = self.commit(name, ctx).await;
                info!(
                    plugin = %name,
                    transforms,
                    components,
                    "Plugin re-initialized with new configuration"
                );
                self.statuses.mark_ready(name).await
            }
            Err(err) => {
                warn!(plugin = %name, error = %err, "Plugin re-initialization failed");
                self.pipeline.unregister_plugin(name).await;
                self.components.unregister_plugin(name).await;
                let status = self.statuses.mark_failed(name, &err).await?;

                let dependents = self.plugin_registry.dependents_of(name).await;
                self.degrade_dependents(name, &dependents, "failed to re-initialize")
                    .await?;
                Ok(status)
            }
        }
    }

    /// Runs the initializer within the init timeout, containing panics, and
    /// returns the context holding its contributions.
    async fn run_initializer(
        &self,
        plugin: &dyn Plugin,
        name: &str,
        config: Value,
    ) -> Result<PluginContext, PluginError> {
        let timeout = self.settings.init_timeout();
        let mut ctx = PluginContext::new(name, config);
        let outcome = match tokio::time::timeout(
            timeout,
            AssertUnwindSafe(plugin.initialize(&mut ctx)).catch_unwind(),
        )
        .await
        {
            Ok(Ok(Ok(()))) => Ok(()),
            Ok(Ok(Err(e))) => Err(format!("{e:#}")),
            Ok(Err(_)) => Err("initializer panicked".to_string()),
            Err(_) => Err(format!("timed out after {} ms", timeout.as_millis())),
        };

        match outcome {
            Ok(()) => Ok(ctx),
            Err(cause) => Err(PluginError::InitializationFailure {
                plugin: name.to_string(),
                cause,
            }),
        }
    }

    /// Replaces everything `name` contributed with the contents of `ctx`.
    /// Returns the number of transforms and components committed.
    async fn commit(&self, name: &str, ctx: PluginContext) -> (usize, usize) {
        let (transforms, components) = ctx.into_parts();
        let counts = (transforms.len(), components.len());
        self.pipeline.replace_plugin(name, transforms).await;
        self.components.replace_plugin(name, components).await;
        counts
    }

    /// Marks every `Ready` plugin in `dependents` as `Failed` because
    /// `dependency` went away or broke.
    async fn degrade_dependents(
        &self,
        dependency: &str,
        dependents: &[String],
        reason: &str,
    ) -> Result<(), PluginError> {
        for dependent in dependents {
            let ready = self
                .statuses
                .get(dependent)
                .await
                .is_ok_and(|s| s.state == PluginState::Ready);
            if ready {
                let err = PluginError::InitializationFailure {
                    plugin: dependent.clone(),
                    cause: format!("dependency '{dependency}' {reason}"),
                };
                warn!(plugin = %dependent, dependency = %dependency, "Dependency lost, plugin degraded");
                self.statuses.mark_failed(dependent, &err).await?;
            }
        }
        Ok(())
    }

    /// Removes a plugin with its status, transforms and component providers.
    ///
    /// Plugins that depend on it, directly or transitively, are marked
    /// `Failed` so their hooks stop running.
    pub async fn unregister(&self, name: &str) -> Result<(), PluginError> {
        let _guard = self.mutation_lock.lock().await;
        self.unregister_locked(name).await
    }

    /// Unregisters every plugin, dependents before their dependencies.
    pub async fn unregister_all(&self) {
        let _guard = self.mutation_lock.lock().await;

        let mut names = self.order.read().await.clone();
        for name in self.plugin_registry.names().await {
            if !names.contains(&name) {
                names.push(name);
            }
        }

        for name in names.iter().rev() {
            if let Err(e) = self.unregister_locked(name).await {
                debug!(plugin = %name, error = %e, "Plugin already removed");
            }
        }

        info!("All plugins unregistered");
    }

    async fn unregister_locked(&self, name: &str) -> Result<(), PluginError> {
        if !self.plugin_registry.contains(name).await {
            return Err(PluginError::PluginNotFound(name.to_string()));
        }

        let dependents = self.plugin_registry.dependents_of(name).await;
        // Status goes first: a status never outlives its descriptor.
        self.statuses.remove(name).await;
        let plugin = self.plugin_registry.unregister(name).await?;
        self.pipeline.unregister_plugin(name).await;
        self.components.unregister_plugin(name).await;
        self.order.write().await.retain(|n| n != name);

        self.degrade_dependents(name, &dependents, "was unregistered")
            .await?;

        let timeout = self.settings.init_timeout();
        match tokio::time::timeout(timeout, plugin.shutdown()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(plugin = %name, error = %e, "Plugin shutdown returned error"),
            Err(_) => warn!(
                plugin = %name,
                timeout_ms = timeout.as_millis() as u64,
                "Plugin shutdown timed out"
            ),
        }

        info!(plugin = %name, degraded = dependents.len(), "Plugin unregistered");
        Ok(())
    }

    /// Enables or disables a plugin for subsequent pipeline runs and
    /// component resolutions.
    pub async fn set_enabled(&self, name: &str, enabled: bool) -> Result<PluginStatus, PluginError> {
        let _guard = self.mutation_lock.lock().await;
        let status = self.statuses.set_enabled(name, enabled).await?;
        info!(plugin = %name, enabled, "Plugin enabled flag changed");
        Ok(status)
    }

    /// Replaces a plugin's effective configuration.
    ///
    /// The new value is kept even if the plugin rejects it; the rejection
    /// is recorded as the plugin's last error. An accepted value re-runs
    /// the initializer of a `Ready` plugin so its transforms and component
    /// providers are rebuilt from it.
    pub async fn update_config(&self, name: &str, config: Value) -> Result<PluginStatus, PluginError> {
        let _guard = self.mutation_lock.lock().await;
        self.update_config_locked(name, config).await
    }

    /// Applies an optional config replacement and an optional enabled flag
    /// as one mutation.
    pub async fn patch(
        &self,
        name: &str,
        enabled: Option<bool>,
        config: Option<Value>,
    ) -> Result<PluginStatus, PluginError> {
        let _guard = self.mutation_lock.lock().await;

        let mut status = self.statuses.get(name).await?;
        if let Some(config) = config {
            status = self.update_config_locked(name, config).await?;
        }
        if let Some(enabled) = enabled {
            status = self.statuses.set_enabled(name, enabled).await?;
            info!(plugin = %name, enabled, "Plugin enabled flag changed");
        }
        Ok(status)
    }

    async fn update_config_locked(&self, name: &str, config: Value) -> Result<PluginStatus, PluginError> {
        let plugin = self
            .plugin_registry
            .get(name)
            .await
            .ok_or_else(|| PluginError::PluginNotFound(name.to_string()))?;

        let status = self.statuses.update_config(name, config).await?;
        info!(plugin = %name, "Plugin configuration updated");

        match plugin.validate_config(&status.config) {
            Ok(()) if status.state == PluginState::Ready => {
                self.reinitialize(name, status.config.clone()).await
            }
            Ok(()) => Ok(status),
            Err(e) => {
                let err = PluginError::InvalidConfig {
                    plugin: name.to_string(),
                    cause: format!("{e:#}"),
                };
                warn!(plugin = %name, error = %err, "Plugin rejected its configuration");
                self.statuses.record_error(name, &err).await;
                self.statuses.get(name).await
            }
        }
    }

    /// Returns one plugin's status.
    pub async fn status(&self, name: &str) -> Result<PluginStatus, PluginError> {
        self.statuses.get(name).await
    }

    /// Returns every status, sorted by name.
    pub async fn statuses(&self) -> Vec<PluginStatus> {
        self.statuses.all().await
    }

    /// Returns one plugin's descriptor.
    ///
    /// A plugin whose registration has not committed its status yet is
    /// reported as not found.
    pub async fn descriptor(&self, name: &str) -> Result<PluginDescriptor, PluginError> {
        self.statuses.get(name).await?;
        self.plugin_registry
            .descriptor(name)
            .await
            .ok_or_else(|| PluginError::PluginNotFound(name.to_string()))
    }

    /// Returns one plugin's listing entry.
    pub async fn summary(&self, name: &str) -> Result<PluginSummary, PluginError> {
        let status = self.statuses.get(name).await?;
        let descriptor = self
            .plugin_registry
            .descriptor(name)
            .await
            .ok_or_else(|| PluginError::PluginNotFound(name.to_string()))?;
        Ok(PluginSummary {
            hooks: self.hook_summary(name).await,
            descriptor,
            status,
        })
    }

    /// Lists every plugin in registration order.
    pub async fn list_plugins(&self) -> Vec<PluginSummary> {
        let statuses = self.statuses.snapshot().await;
        let mut summaries = Vec::new();

        for descriptor in self.plugin_registry.descriptors().await {
            let Some(status) = statuses.get(&descriptor.name).cloned() else {
                continue;
            };
            summaries.push(PluginSummary {
                hooks: self.hook_summary(&descriptor.name).await,
                descriptor,
                status,
            });
        }
        summaries
    }

    async fn hook_summary(&self, name: &str) -> HookSummary {
        HookSummary {
            transforms: self.pipeline.hook_count(name).await,
            components: self.components.points_owned_by(name).await,
        }
    }

    /// Order of the last successful [`Self::initialize_all`].
    pub async fn initialization_order(&self) -> Vec<String> {
        self.order.read().await.clone()
    }

    /// Number of registered plugins.
    pub async fn plugin_count(&self) -> usize {
        self.plugin_registry.count().await
    }

    /// Fetches every post and runs it through the enabled plugins.
    pub async fn enhanced_posts(&self) -> AppResult<Vec<ContentItem>> {
        let items = self.content.fetch_all().await?;
        Ok(self.enhance(items).await)
    }

    /// Fetches one post and runs it through the enabled plugins.
    ///
    /// Returns `Ok(None)` when the provider has no post with that slug.
    pub async fn enhanced_post(&self, slug: &str) -> AppResult<Option<ContentItem>> {
        let Some(item) = self.content.fetch_one(slug).await? else {
            debug!(slug = %slug, "Post not found");
            return Ok(None);
        };
        Ok(self.enhance(vec![item]).await.pop())
    }

    /// Runs already-fetched items through the enabled plugins.
    pub async fn enhance(&self, items: Vec<ContentItem>) -> Vec<ContentItem> {
        let stages = self.stages().await;
        self.pipeline.run(&stages, items).await
    }

    /// Snapshot of enabled `Ready` plugins in dependency order. Plugins
    /// whose current config fails validation sit the run out.
    async fn stages(&self) -> Vec<PipelineStage> {
        let order = self.order.read().await.clone();
        let statuses = self.statuses.snapshot().await;
        let mut stages = Vec::with_capacity(order.len());

        for name in order {
            let Some(status) = statuses.get(&name) else {
                continue;
            };
            if !status.is_active() {
                continue;
            }
            if let Some(plugin) = self.plugin_registry.get(&name).await {
                if let Err(e) = plugin.validate_config(&status.config) {
                    let err = PluginError::InvalidConfig {
                        plugin: name.clone(),
                        cause: format!("{e:#}"),
                    };
                    warn!(plugin = %name, error = %err, "Skipping plugin with invalid configuration");
                    self.statuses.record_error(&name, &err).await;
                    continue;
                }
            }
            stages.push(self.pipeline.stage(&name, status.config.clone()).await);
        }
        stages
    }

    /// Resolves an extension point. Providers of disabled or not-ready
    /// plugins resolve to [`Resolution::Absent`].
    pub async fn resolve_component(&self, point: &str) -> Resolution {
        let Some((owner, provider)) = self.components.lookup(point).await else {
            return Resolution::Absent;
        };

        match self.statuses.get(&owner).await {
            Ok(status) if status.is_active() => provider.into(),
            _ => {
                debug!(point = %point, plugin = %owner, "Component owner inactive");
                Resolution::Absent
            }
        }
    }

    /// Upper bound callers should apply when loading deferred components.
    pub fn component_timeout(&self) -> Duration {
        self.settings.component_timeout()
    }

    /// Name of the configured content provider.
    pub fn content_provider(&self) -> &str {
        self.content.provider_type()
    }
}
