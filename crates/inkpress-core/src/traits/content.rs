//! Content provider boundary.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::content::ContentItem;

/// Source of raw, unenhanced posts.
///
/// Adapters surface network/auth/parse failures as errors and do not retry
/// internally; retry policy belongs to the adapter's own configuration.
#[async_trait]
pub trait ContentProvider: Send + Sync + std::fmt::Debug {
    /// Short identifier of the provider kind (e.g. `"memory"`, `"json-file"`).
    fn provider_type(&self) -> &str;

    /// Fetch every published post.
    async fn fetch_all(&self) -> AppResult<Vec<ContentItem>>;

    /// Fetch one post by slug. Returns `Ok(None)` when no post has that slug.
    async fn fetch_one(&self, slug: &str) -> AppResult<Option<ContentItem>>;
}
