//! # inkpress-plugin
//!
//! Plugin runtime for Inkpress. Provides:
//!
//! - Plugin descriptors and the [`Plugin`] capability trait
//! - Dependency resolution with deterministic ordering
//! - A failure-isolated, time-bounded content transform pipeline
//! - A component registry for swappable UI extension points
//! - A status store tracking enabled flag, config and errors per plugin
//! - The [`PluginManager`] facade and its administrative surface

pub mod admin;
pub mod components;
pub mod config;
pub mod context;
pub mod descriptor;
pub mod error;
pub mod hooks;
pub mod manager;
pub mod prelude;
pub mod registry;
pub mod resolver;
pub mod status;
pub mod traits;

pub use admin::{PluginAdmin, PluginPatch};
pub use components::{
    ComponentDescriptor, ComponentProvider, ComponentRegistry, DeferredComponent, Resolution,
};
pub use config::parse_config;
pub use context::{HookSummary, PluginContext};
pub use descriptor::{Plugin, PluginDescriptor};
pub use error::PluginError;
pub use hooks::{HookPipeline, HookRegistry, PipelineStage, TransformHook};
pub use manager::{FailedPlugin, InitReport, PluginManager, PluginSummary};
pub use registry::PluginRegistry;
pub use status::{PluginState, PluginStatus, StatusStore};
pub use traits::TransformFn;
