//! JSON file content provider.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use inkpress_core::error::{AppError, ErrorKind};
use inkpress_core::result::AppResult;
use inkpress_core::traits::content::ContentProvider;
use inkpress_core::types::content::ContentItem;

/// Reads posts from a JSON file containing an array of [`ContentItem`]s.
///
/// The file is re-read on every fetch so edits show up without a restart.
#[derive(Debug, Clone)]
pub struct JsonFileContentProvider {
    /// Path to the posts file.
    path: PathBuf,
}

impl JsonFileContentProvider {
    /// Create a provider reading from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn load(&self) -> AppResult<Vec<ContentItem>> {
        let raw = fs::read(&self.path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                format!("Failed to read posts file: {}", self.path.display()),
                e,
            )
        })?;

        let items: Vec<ContentItem> = serde_json::from_slice(&raw).map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                format!("Malformed posts file: {}", self.path.display()),
                e,
            )
        })?;

        debug!(path = %self.path.display(), count = items.len(), "Posts loaded");
        Ok(items)
    }
}

#[async_trait]
impl ContentProvider for JsonFileContentProvider {
    fn provider_type(&self) -> &str {
        "json-file"
    }

    async fn fetch_all(&self) -> AppResult<Vec<ContentItem>> {
        self.load().await
    }

    async fn fetch_one(&self, slug: &str) -> AppResult<Option<ContentItem>> {
        Ok(self.load().await?.into_iter().find(|item| item.slug == slug))
    }
}
