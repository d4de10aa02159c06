//! # inkpress-core
//!
//! Core crate for Inkpress. Contains the configuration schemas, the
//! content model shared by providers and plugins, the content provider
//! trait, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Inkpress crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
