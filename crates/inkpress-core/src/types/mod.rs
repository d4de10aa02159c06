//! Shared domain types.

pub mod content;

pub use content::ContentItem;
