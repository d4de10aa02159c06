//! Tag normalizer plugin.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;

use inkpress_core::types::content::ContentItem;
use inkpress_plugin::prelude::*;

/// Plugin name.
pub const NAME: &str = "tag-normalizer";

/// Configuration of the tag normalizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagNormalizerConfig {
    /// Lowercase every tag.
    pub lowercase: bool,
    /// Tag → canonical tag, applied after trimming and lowercasing.
    pub aliases: BTreeMap<String, String>,
}

impl Default for TagNormalizerConfig {
    fn default() -> Self {
        Self {
            lowercase: true,
            aliases: BTreeMap::new(),
        }
    }
}

impl TagNormalizerConfig {
    /// Reads and checks a configuration value.
    pub fn from_value(config: &Value) -> anyhow::Result<Self> {
        let parsed: Self = parse_config(config)?;
        if let Some((alias, _)) = parsed.aliases.iter().find(|(_, target)| target.trim().is_empty()) {
            anyhow::bail!("alias '{alias}' has an empty target");
        }
        Ok(parsed)
    }

    /// Normalizes a tag list: trim, optionally lowercase, resolve aliases,
    /// drop empties and duplicates (first occurrence wins).
    pub fn normalize(&self, tags: &[String]) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut normalized = Vec::with_capacity(tags.len());

        for tag in tags {
            let tag = self.canonical(tag.trim());
            if tag.is_empty() {
                continue;
            }
            if seen.insert(tag.clone()) {
                normalized.push(tag);
            }
        }
        normalized
    }

    fn canonical(&self, tag: &str) -> String {
        let tag = if self.lowercase {
            tag.to_lowercase()
        } else {
            tag.to_string()
        };
        match self.aliases.get(&tag) {
            Some(target) if self.lowercase => target.trim().to_lowercase(),
            Some(target) => target.trim().to_string(),
            None => tag,
        }
    }
}

/// Normalizes post tags.
#[derive(Debug, Default)]
pub struct TagNormalizerPlugin;

impl TagNormalizerPlugin {
    /// Creates the plugin.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Plugin for TagNormalizerPlugin {
    fn descriptor(&self) -> PluginDescriptor {
        PluginDescriptor::new(NAME, env!("CARGO_PKG_VERSION"))
            .with_description("Trims, lowercases, de-aliases and de-duplicates post tags")
            .with_author("Inkpress Team")
            .with_config(json!({ "lowercase": true, "aliases": {} }))
    }

    async fn initialize(&self, ctx: &mut PluginContext) -> anyhow::Result<()> {
        let config = TagNormalizerConfig::from_value(ctx.config())?;
        ctx.add_transform(NormalizeTags);
        info!(
            plugin = ctx.plugin_name(),
            lowercase = config.lowercase,
            aliases = config.aliases.len(),
            "Tag normalizer ready"
        );
        Ok(())
    }

    fn validate_config(&self, config: &Value) -> anyhow::Result<()> {
        TagNormalizerConfig::from_value(config).map(|_| ())
    }
}

#[derive(Debug)]
struct NormalizeTags;

#[async_trait]
impl TransformHook for NormalizeTags {
    fn name(&self) -> &str {
        "normalize_tags"
    }

    async fn transform(&self, mut item: ContentItem, config: &Value) -> anyhow::Result<ContentItem> {
        let config = TagNormalizerConfig::from_value(config)?;
        item.tags = config.normalize(&item.tags);
        Ok(item)
    }
}
