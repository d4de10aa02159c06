//! Content provider configuration.

use serde::{Deserialize, Serialize};

/// Where raw posts are read from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Path to a JSON file holding an array of posts.
    #[serde(default = "default_posts_path")]
    pub posts_path: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            posts_path: default_posts_path(),
        }
    }
}

fn default_posts_path() -> String {
    "data/posts.json".to_string()
}
