//! Prelude for plugin authors.

pub use async_trait::async_trait;

pub use inkpress_core::types::content::ContentItem;

pub use crate::components::{ComponentDescriptor, ComponentProvider, DeferredComponent};
pub use crate::config::parse_config;
pub use crate::context::PluginContext;
pub use crate::descriptor::{Plugin, PluginDescriptor};
pub use crate::hooks::registry::TransformHook;
pub use crate::traits::TransformFn;
