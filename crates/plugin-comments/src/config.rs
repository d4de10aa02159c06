//! Configuration for the comments plugin.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use validator::Validate;

use inkpress_plugin::config::parse_config;

/// Comments plugin configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct CommentsConfig {
    /// Discussion backend rendered by the widget.
    #[validate(length(min = 1))]
    pub provider: String,
    /// Repository holding the discussions. Required.
    pub repo: Option<String>,
    /// Discussion category, if the backend uses one.
    pub category: Option<String>,
    /// Register the widget as a deferred provider.
    pub lazy: bool,
    /// Posts carrying this tag get no thread.
    #[validate(length(min = 1))]
    pub disabled_tag: String,
}

impl Default for CommentsConfig {
    fn default() -> Self {
        Self {
            provider: "giscus".to_string(),
            repo: None,
            category: None,
            lazy: false,
            disabled_tag: "no-comments".to_string(),
        }
    }
}

impl CommentsConfig {
    /// Reads and checks a configuration value.
    pub fn from_value(config: &Value) -> anyhow::Result<Self> {
        let parsed: Self = parse_config(config)?;
        parsed.validate()?;
        if parsed.repository().is_none() {
            anyhow::bail!("'repo' is required");
        }
        Ok(parsed)
    }

    /// The configured repository, ignoring blank values.
    pub fn repository(&self) -> Option<&str> {
        self.repo.as_deref().map(str::trim).filter(|r| !r.is_empty())
    }

    /// Props handed to the rendering layer.
    pub fn widget_props(&self) -> Value {
        json!({
            "provider": self.provider,
            "repo": self.repository(),
            "category": self.category,
        })
    }
}
