//! Comments plugin implementation.

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{debug, info};

use inkpress_core::types::content::ContentItem;
use inkpress_plugin::prelude::*;

use crate::config::CommentsConfig;

/// Plugin name.
pub const NAME: &str = "comments";

/// Extension point filled by this plugin.
pub const COMMENTS_SECTION: &str = "CommentsSection";

/// Plugin whose normalized tags the opt-out check relies on.
const TAG_NORMALIZER: &str = "tag-normalizer";

/// Component identifier known to the rendering layer.
const WIDGET: &str = "CommentsWidget";

/// Extension key carrying the thread mapping.
const EXTENSION_KEY: &str = "comments";

/// Discussion threads for posts.
#[derive(Debug, Default)]
pub struct CommentsPlugin;

impl CommentsPlugin {
    /// Creates the plugin.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Plugin for CommentsPlugin {
    fn descriptor(&self) -> PluginDescriptor {
        PluginDescriptor::new(NAME, env!("CARGO_PKG_VERSION"))
            .with_description("Discussion threads for posts")
            .with_author("Inkpress Team")
            .with_dependency(TAG_NORMALIZER)
            .with_config(json!({
                "provider": "giscus",
                "lazy": false,
                "disabled_tag": "no-comments",
            }))
    }

    async fn initialize(&self, ctx: &mut PluginContext) -> anyhow::Result<()> {
        let config = CommentsConfig::from_value(ctx.config())?;
        let props = config.widget_props();

        let provider = if config.lazy {
            ComponentProvider::Deferred(DeferredComponent::new(move || {
                let props = props.clone();
                async move { Ok::<_, anyhow::Error>(ComponentDescriptor::new(WIDGET, props)) }
            }))
        } else {
            ComponentProvider::Ready(ComponentDescriptor::new(WIDGET, props))
        };

        ctx.provide_component(COMMENTS_SECTION, provider);
        ctx.add_transform(AttachThread);

        info!(
            plugin = ctx.plugin_name(),
            provider = %config.provider,
            lazy = config.lazy,
            "Comments ready"
        );
        Ok(())
    }

    fn validate_config(&self, config: &Value) -> anyhow::Result<()> {
        CommentsConfig::from_value(config).map(|_| ())
    }
}

#[derive(Debug)]
struct AttachThread;

#[async_trait]
impl TransformHook for AttachThread {
    fn name(&self) -> &str {
        "attach_thread"
    }

    async fn transform(&self, mut item: ContentItem, config: &Value) -> anyhow::Result<ContentItem> {
        let config = CommentsConfig::from_value(config)?;

        if item.has_tag(&config.disabled_tag) {
            debug!(slug = %item.slug, "Comments disabled for post");
            item.set_extension(EXTENSION_KEY, Value::Null);
        } else {
            item.set_extension(
                EXTENSION_KEY,
                json!({ "provider": config.provider, "term": item.slug }),
            );
        }
        Ok(item)
    }
}
