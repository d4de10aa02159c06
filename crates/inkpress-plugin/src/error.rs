//! Error taxonomy of the plugin runtime.
//!
//! Registration and resolution errors are returned to the caller of the
//! batch operation that triggered them. Initialization and hook failures
//! are recorded on the plugin's status instead of propagating, and are
//! only constructed here so that the recorded text is uniform.

use inkpress_core::error::{AppError, ErrorKind};
use thiserror::Error;

/// Errors produced by the plugin runtime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PluginError {
    /// A plugin with this name is already registered.
    #[error("Plugin '{0}' is already registered")]
    DuplicateName(String),

    /// No plugin with this name is registered.
    #[error("Plugin '{0}' not found")]
    PluginNotFound(String),

    /// The descriptor was rejected at registration.
    #[error("Invalid plugin descriptor: {0}")]
    InvalidDescriptor(String),

    /// A declared dependency is not registered.
    #[error("Plugin '{plugin}' depends on '{dependency}', which is not registered")]
    MissingDependency {
        /// The dependent plugin.
        plugin: String,
        /// The absent dependency.
        dependency: String,
    },

    /// The dependency graph contains a cycle.
    #[error("Cyclic plugin dependency: {}", format_cycle(.cycle))]
    CyclicDependency {
        /// Plugins on the cycle, each depending on the next.
        cycle: Vec<String>,
    },

    /// A plugin rejected its configuration.
    #[error("Invalid configuration for plugin '{plugin}': {cause}")]
    InvalidConfig {
        /// The plugin that rejected the value.
        plugin: String,
        /// Why it was rejected.
        cause: String,
    },

    /// A plugin's initializer failed, timed out, or a dependency failed.
    #[error("Plugin '{plugin}' failed to initialize: {cause}")]
    InitializationFailure {
        /// The failed plugin.
        plugin: String,
        /// What went wrong.
        cause: String,
    },

    /// A transform hook failed or timed out for one content item.
    #[error("Plugin '{plugin}' failed to transform '{slug}': {cause}")]
    HookExecutionFailure {
        /// The plugin owning the hook.
        plugin: String,
        /// Slug of the item being transformed.
        slug: String,
        /// What went wrong.
        cause: String,
    },

    /// A deferred component provider failed or timed out.
    #[error("Component '{point}' failed to resolve: {cause}")]
    ComponentResolutionFailure {
        /// The extension point being resolved.
        point: String,
        /// What went wrong.
        cause: String,
    },
}

impl PluginError {
    /// Maps this error onto the application-wide error kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DuplicateName(_) => ErrorKind::Conflict,
            Self::PluginNotFound(_) => ErrorKind::NotFound,
            Self::InvalidDescriptor(_) | Self::InvalidConfig { .. } => ErrorKind::Validation,
            Self::MissingDependency { .. } | Self::CyclicDependency { .. } => {
                ErrorKind::Configuration
            }
            Self::InitializationFailure { .. }
            | Self::HookExecutionFailure { .. }
            | Self::ComponentResolutionFailure { .. } => ErrorKind::Plugin,
        }
    }
}

impl From<PluginError> for AppError {
    fn from(err: PluginError) -> Self {
        AppError::new(err.kind(), err.to_string())
    }
}

fn format_cycle(cycle: &[String]) -> String {
    match cycle.first() {
        Some(first) => format!("{} -> {}", cycle.join(" -> "), first),
        None => String::new(),
    }
}
