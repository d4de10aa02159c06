//! Shared test helpers for integration tests.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Notify;

use inkpress_content::MemoryContentProvider;
use inkpress_core::config::PluginSystemConfig;
use inkpress_core::types::content::ContentItem;
use inkpress_plugin::{Plugin, PluginContext, PluginDescriptor, PluginManager, TransformFn};

/// Manager wired to an in-memory content provider
pub struct TestRuntime {
    /// The manager under test
    pub manager: Arc<PluginManager>,
    /// Handle to the provider the manager reads from
    pub content: MemoryContentProvider,
}

impl TestRuntime {
    /// Create a runtime serving `posts` with default settings
    pub fn new(posts: Vec<ContentItem>) -> Self {
        Self::with_settings(posts, PluginSystemConfig::default())
    }

    /// Create a runtime serving `posts` with the given settings
    pub fn with_settings(posts: Vec<ContentItem>, settings: PluginSystemConfig) -> Self {
        let content = MemoryContentProvider::new(posts);
        let manager = PluginManager::new(settings, Arc::new(content.clone()));
        Self {
            manager: Arc::new(manager),
            content,
        }
    }

    /// Register every plugin, panicking on registration errors
    pub async fn register_all(&self, plugins: Vec<Arc<dyn Plugin>>) {
        for plugin in plugins {
            self.manager
                .register(plugin)
                .await
                .expect("Failed to register plugin");
        }
    }

    /// Tags of every enhanced post, in provider order
    pub async fn enhanced_tags(&self) -> Vec<Vec<String>> {
        self.manager
            .enhanced_posts()
            .await
            .expect("Failed to fetch posts")
            .into_iter()
            .map(|p| p.tags)
            .collect()
    }
}

/// A post with the given slug and tags
pub fn post(slug: &str, tags: &[&str]) -> ContentItem {
    ContentItem::new(slug, slug.replace('-', " ")).with_tags(tags.iter().copied())
}

type Setup = Arc<dyn Fn(&mut PluginContext) -> anyhow::Result<()> + Send + Sync>;

/// Two-way handshake for pausing a plugin mid-operation
#[derive(Debug, Default)]
pub struct Gate {
    /// Signalled when the gated operation starts
    pub entered: Notify,
    /// Signal to let the gated operation finish
    pub release: Notify,
}

impl Gate {
    /// Create a shared gate
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Report entry and wait for release
    pub async fn pass(&self) {
        self.entered.notify_one();
        self.release.notified().await;
    }
}

/// Plugin assembled from a descriptor and a setup closure
pub struct FixturePlugin {
    descriptor: PluginDescriptor,
    setup: Setup,
    gate: Option<Arc<Gate>>,
}

impl std::fmt::Debug for FixturePlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixturePlugin")
            .field("descriptor", &self.descriptor)
            .finish()
    }
}

impl FixturePlugin {
    /// Create a plugin named `name` depending on `deps` that contributes nothing
    pub fn new(name: &str, deps: &[&str]) -> Self {
        let descriptor = deps
            .iter()
            .fold(PluginDescriptor::new(name, "1.0.0"), |d, dep| {
                d.with_dependency(*dep)
            });
        Self {
            descriptor,
            setup: Arc::new(|_| Ok(())),
            gate: None,
        }
    }

    /// Run `setup` during initialization
    pub fn with_setup<F>(mut self, setup: F) -> Self
    where
        F: Fn(&mut PluginContext) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.setup = Arc::new(setup);
        self
    }

    /// Pause initialization on `gate`
    pub fn with_gate(mut self, gate: Arc<Gate>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Contribute a single transform
    pub fn with_transform(self, make: fn() -> TransformFn) -> Self {
        self.with_setup(move |ctx| {
            ctx.add_transform(make());
            Ok(())
        })
    }

    /// Erase the type for registration
    pub fn arc(self) -> Arc<dyn Plugin> {
        Arc::new(self)
    }
}

#[async_trait]
impl Plugin for FixturePlugin {
    fn descriptor(&self) -> PluginDescriptor {
        self.descriptor.clone()
    }

    async fn initialize(&self, ctx: &mut PluginContext) -> anyhow::Result<()> {
        if let Some(gate) = &self.gate {
            gate.pass().await;
        }
        (self.setup)(ctx)
    }
}

/// Transform appending `"reviewed"`
pub fn append_reviewed() -> TransformFn {
    append_tag("reviewed")
}

/// Transform upper-casing `"reviewed"` when present
pub fn uppercase_reviewed() -> TransformFn {
    TransformFn::sync("uppercase_reviewed", |mut item, _| {
        for tag in item.tags.iter_mut().filter(|t| t.as_str() == "reviewed") {
            *tag = tag.to_uppercase();
        }
        Ok(item)
    })
}

/// Transform appending a fixed tag
pub fn append_tag(tag: &'static str) -> TransformFn {
    TransformFn::sync(tag, move |mut item, _| {
        item.tags.push(tag.to_string());
        Ok(item)
    })
}
