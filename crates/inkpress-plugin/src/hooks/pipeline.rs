//! Hook pipeline: runs content through enabled plugins' transforms.
//!
//! - Stages run in the order given, which the manager derives from the
//!   dependency order, so later plugins observe earlier enrichments.
//! - A failing, panicking or timed-out hook is recorded against its plugin
//!   and the item continues from its last good state.
//! - Items are independent and processed concurrently; output order
//!   matches input order.

use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use futures::future::join_all;
use serde_json::Value;
use tracing::{debug, warn};

use inkpress_core::types::content::ContentItem;

use super::registry::{HookRegistry, TransformHook};
use crate::error::PluginError;
use crate::status::StatusStore;

/// One plugin's slice of a pipeline run, captured when the run starts.
#[derive(Debug, Clone)]
pub struct PipelineStage {
    /// Owning plugin.
    pub plugin: String,
    /// Plugin config as of the start of the run.
    pub config: Value,
    /// The plugin's transforms, in registration order.
    pub hooks: Vec<Arc<dyn TransformHook>>,
}

/// Executes transform hooks over content items.
#[derive(Debug)]
pub struct HookPipeline {
    /// Hook registry.
    registry: Arc<HookRegistry>,
    /// Where failures are recorded.
    statuses: Arc<StatusStore>,
    /// Upper bound for a single hook invocation.
    hook_timeout: Duration,
}

impl HookPipeline {
    /// Creates a new pipeline.
    pub fn new(registry: Arc<HookRegistry>, statuses: Arc<StatusStore>, hook_timeout: Duration) -> Self {
        Self {
            registry,
            statuses,
            hook_timeout,
        }
    }

    /// Attaches a transform owned by `plugin`.
    pub async fn register(&self, plugin: &str, hook: Arc<dyn TransformHook>) {
        self.registry.register(plugin, hook).await;
    }

    /// Swaps `plugin`'s transforms for `hooks` in one step.
    pub async fn replace_plugin(&self, plugin: &str, hooks: Vec<Arc<dyn TransformHook>>) -> usize {
        self.registry.replace_plugin(plugin, hooks).await
    }

    /// Drops every transform owned by `plugin`.
    pub async fn unregister_plugin(&self, plugin: &str) -> usize {
        self.registry.unregister_plugin(plugin).await
    }

    /// Number of transforms owned by `plugin`.
    pub async fn hook_count(&self, plugin: &str) -> usize {
        self.registry.hook_count(plugin).await
    }

    /// Captures `plugin`'s current hooks with the given config.
    pub async fn stage(&self, plugin: &str, config: Value) -> PipelineStage {
        PipelineStage {
            plugin: plugin.to_string(),
            config,
            hooks: self.registry.get_hooks(plugin).await,
        }
    }

    /// Runs every item through `stages`.
    pub async fn run(&self, stages: &[PipelineStage], items: Vec<ContentItem>) -> Vec<ContentItem> {
        if stages.is_empty() || items.is_empty() {
            return items;
        }

        debug!(
            stages = stages.len(),
            items = items.len(),
            "Running content pipeline"
        );

        let outcomes = join_all(items.into_iter().map(|item| self.run_item(stages, item))).await;

        let mut failed_plugins = HashSet::new();
        let mut enhanced = Vec::with_capacity(outcomes.len());
        for (item, failures) in outcomes {
            for failure in failures {
                if let PluginError::HookExecutionFailure { plugin, .. } = &failure {
                    self.statuses.record_error(plugin, &failure).await;
                    failed_plugins.insert(plugin.clone());
                }
            }
            enhanced.push(item);
        }

        for stage in stages {
            if !failed_plugins.contains(&stage.plugin) {
                self.statuses.clear_error(&stage.plugin).await;
            }
        }

        enhanced
    }

    async fn run_item(
        &self,
        stages: &[PipelineStage],
        item: ContentItem,
    ) -> (ContentItem, Vec<PluginError>) {
        let mut current = item;
        let mut failures = Vec::new();

        for stage in stages {
            for hook in &stage.hooks {
                let input = current.clone();
                let call = AssertUnwindSafe(hook.transform(input, &stage.config)).catch_unwind();

                let cause = match tokio::time::timeout(self.hook_timeout, call).await {
                    Ok(Ok(Ok(next))) => {
                        current = next;
                        continue;
                    }
                    Ok(Ok(Err(e))) => format!("{e:#}"),
                    Ok(Err(_)) => "hook panicked".to_string(),
                    Err(_) => format!("timed out after {} ms", self.hook_timeout.as_millis()),
                };

                let failure = PluginError::HookExecutionFailure {
                    plugin: stage.plugin.clone(),
                    slug: current.slug.clone(),
                    cause,
                };
                warn!(
                    plugin = %stage.plugin,
                    hook = %hook.name(),
                    slug = %current.slug,
                    error = %failure,
                    "Transform hook failed, keeping last good state"
                );
                failures.push(failure);
            }
        }

        (current, failures)
    }
}
