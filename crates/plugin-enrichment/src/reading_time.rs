//! Reading time plugin.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;
use validator::Validate;

use inkpress_core::types::content::ContentItem;
use inkpress_plugin::prelude::*;

/// Plugin name.
pub const NAME: &str = "reading-time";

/// Extension key the estimate is written to.
pub const EXTENSION_KEY: &str = "reading_time_minutes";

/// Configuration of the reading time estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ReadingTimeConfig {
    /// Reading speed.
    #[validate(range(min = 1, max = 10_000))]
    pub words_per_minute: u32,
}

impl Default for ReadingTimeConfig {
    fn default() -> Self {
        Self {
            words_per_minute: 200,
        }
    }
}

impl ReadingTimeConfig {
    /// Reads and checks a configuration value.
    pub fn from_value(config: &Value) -> anyhow::Result<Self> {
        let parsed: Self = parse_config(config)?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Whole minutes needed to read `body`, rounded up.
    pub fn minutes(&self, body: &str) -> usize {
        let words = body.split_whitespace().count();
        words.div_ceil(self.words_per_minute as usize)
    }
}

/// Estimates reading time.
#[derive(Debug, Default)]
pub struct ReadingTimePlugin;

impl ReadingTimePlugin {
    /// Creates the plugin.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Plugin for ReadingTimePlugin {
    fn descriptor(&self) -> PluginDescriptor {
        PluginDescriptor::new(NAME, env!("CARGO_PKG_VERSION"))
            .with_description("Adds an estimated reading time to every post")
            .with_author("Inkpress Team")
            .with_config(json!({ "words_per_minute": 200 }))
    }

    async fn initialize(&self, ctx: &mut PluginContext) -> anyhow::Result<()> {
        let config = ReadingTimeConfig::from_value(ctx.config())?;
        ctx.add_transform(EstimateReadingTime);
        info!(plugin = ctx.plugin_name(), words_per_minute = config.words_per_minute, "Reading time ready");
        Ok(())
    }

    fn validate_config(&self, config: &Value) -> anyhow::Result<()> {
        ReadingTimeConfig::from_value(config).map(|_| ())
    }
}

#[derive(Debug)]
struct EstimateReadingTime;

#[async_trait]
impl TransformHook for EstimateReadingTime {
    fn name(&self) -> &str {
        "estimate_reading_time"
    }

    async fn transform(&self, mut item: ContentItem, config: &Value) -> anyhow::Result<ContentItem> {
        let config = ReadingTimeConfig::from_value(config)?;
        let minutes = config.minutes(&item.body);
        item.set_extension(EXTENSION_KEY, json!(minutes));
        Ok(item)
    }
}
