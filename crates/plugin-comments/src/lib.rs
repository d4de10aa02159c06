//! # Plugin Comments
//!
//! Attaches discussion threads to posts. The plugin:
//!
//! - fills the `CommentsSection` extension point, eagerly or lazily
//! - annotates each post with the thread it maps to, unless the post opts
//!   out with a tag
//!
//! It runs after `tag-normalizer` so the opt-out tag matches regardless of
//! how authors spelled it.

pub mod config;
pub mod plugin;

pub use config::CommentsConfig;
pub use plugin::{COMMENTS_SECTION, CommentsPlugin, NAME};
