//! In-memory content provider.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use inkpress_core::error::AppError;
use inkpress_core::result::AppResult;
use inkpress_core::traits::content::ContentProvider;
use inkpress_core::types::content::ContentItem;

/// Content provider backed by a vector of posts.
///
/// Clones share the same storage, so a test can keep a handle to swap
/// posts or inject an outage after handing the provider to a manager.
#[derive(Debug, Clone, Default)]
pub struct MemoryContentProvider {
    /// Posts in publication order.
    items: Arc<RwLock<Vec<ContentItem>>>,
    /// When set, every fetch fails with this message.
    outage: Arc<RwLock<Option<String>>>,
}

impl MemoryContentProvider {
    /// Create a provider holding the given posts.
    pub fn new(items: Vec<ContentItem>) -> Self {
        Self {
            items: Arc::new(RwLock::new(items)),
            outage: Arc::new(RwLock::new(None)),
        }
    }

    /// Replace all posts.
    pub async fn replace(&self, items: Vec<ContentItem>) {
        *self.items.write().await = items;
    }

    /// Make subsequent fetches fail (`Some`) or succeed again (`None`).
    pub async fn set_outage(&self, message: Option<&str>) {
        *self.outage.write().await = message.map(str::to_string);
    }

    async fn check_outage(&self) -> AppResult<()> {
        match self.outage.read().await.as_deref() {
            Some(message) => Err(AppError::external_service(format!(
                "Content provider unavailable: {message}"
            ))),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ContentProvider for MemoryContentProvider {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn fetch_all(&self) -> AppResult<Vec<ContentItem>> {
        self.check_outage().await?;
        Ok(self.items.read().await.clone())
    }

    async fn fetch_one(&self, slug: &str) -> AppResult<Option<ContentItem>> {
        self.check_outage().await?;
        let items = self.items.read().await;
        Ok(items.iter().find(|item| item.slug == slug).cloned())
    }
}
