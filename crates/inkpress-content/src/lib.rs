//! # inkpress-content
//!
//! Adapters implementing [`inkpress_core::traits::ContentProvider`]:
//!
//! - [`MemoryContentProvider`] holds posts in memory (fixtures, tests)
//! - [`JsonFileContentProvider`] reads a JSON array of posts from disk

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileContentProvider;
pub use memory::MemoryContentProvider;
