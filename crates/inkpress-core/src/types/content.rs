//! Content items flowing through the enhancement pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A post as returned by the content provider.
///
/// Plugins receive owned copies and return enhanced copies; the provider's
/// record is never mutated in place. Enrichments that do not fit the fixed
/// fields go into [`ContentItem::extensions`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    /// Unique, URL-safe identifier.
    pub slug: String,
    /// Post title.
    pub title: String,
    /// Optional short summary.
    #[serde(default)]
    pub summary: Option<String>,
    /// Post body (markdown or rendered HTML, opaque to the runtime).
    #[serde(default)]
    pub body: String,
    /// Free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Publication timestamp.
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    /// Plugin-attached data, keyed by the attaching feature.
    #[serde(default)]
    pub extensions: Map<String, Value>,
}

impl ContentItem {
    /// Creates a post with the given slug and title and no other data.
    pub fn new(slug: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            title: title.into(),
            summary: None,
            body: String::new(),
            tags: Vec::new(),
            published_at: None,
            extensions: Map::new(),
        }
    }

    /// Sets the body.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Replaces the tag list.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Whether the post carries `tag` (exact match).
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Gets an extension value by key.
    pub fn extension(&self, key: &str) -> Option<&Value> {
        self.extensions.get(key)
    }

    /// Inserts or replaces an extension value.
    pub fn set_extension(&mut self, key: impl Into<String>, value: Value) {
        self.extensions.insert(key.into(), value);
    }
}
