//! Core traits defined in `inkpress-core` and implemented by other crates.

pub mod content;

pub use content::ContentProvider;
