//! Closure adapters for writing hooks without a dedicated type.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;

use inkpress_core::types::content::ContentItem;

use crate::hooks::registry::TransformHook;

type TransformClosure =
    Arc<dyn Fn(ContentItem, Value) -> BoxFuture<'static, anyhow::Result<ContentItem>> + Send + Sync>;

/// A closure-based transform hook.
pub struct TransformFn {
    /// Label used in logs.
    label: String,
    /// Transform function.
    handler: TransformClosure,
}

impl std::fmt::Debug for TransformFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformFn")
            .field("label", &self.label)
            .field("handler", &"<closure>")
            .finish()
    }
}

impl TransformFn {
    /// Creates a transform from an async closure.
    ///
    /// The closure receives an owned copy of the plugin config so the
    /// returned future can be `'static`.
    pub fn new<F, Fut>(label: &str, handler: F) -> Self
    where
        F: Fn(ContentItem, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<ContentItem>> + Send + 'static,
    {
        Self {
            label: label.to_string(),
            handler: Arc::new(move |item, config| Box::pin(handler(item, config))),
        }
    }

    /// Creates a transform from a synchronous closure.
    pub fn sync<F>(label: &str, handler: F) -> Self
    where
        F: Fn(ContentItem, &Value) -> anyhow::Result<ContentItem> + Send + Sync + 'static,
    {
        Self {
            label: label.to_string(),
            handler: Arc::new(move |item, config| {
                let result = handler(item, &config);
                Box::pin(async move { result })
            }),
        }
    }
}

#[async_trait]
impl TransformHook for TransformFn {
    fn name(&self) -> &str {
        &self.label
    }

    async fn transform(&self, item: ContentItem, config: &Value) -> anyhow::Result<ContentItem> {
        (self.handler)(item, config.clone()).await
    }
}
