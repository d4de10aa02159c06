//! Administrative surface: list, patch and remove plugins.
//!
//! Every failure is an [`AppError`], so a transport layer can map
//! [`AppError::status_code`] straight onto its responses: unknown plugins
//! are `404`, malformed or empty patches are `422`, runtime faults `500`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use inkpress_core::error::AppError;
use inkpress_core::result::AppResult;

use crate::manager::{PluginManager, PluginSummary};
use crate::status::PluginStatus;

/// Body of a patch request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PluginPatch {
    /// New enabled flag.
    #[serde(default)]
    pub enabled: Option<bool>,
    /// Replacement configuration.
    #[serde(default)]
    pub config: Option<Value>,
}

impl PluginPatch {
    /// Parses a JSON request body.
    pub fn parse(body: &str) -> AppResult<Self> {
        serde_json::from_str(body)
            .map_err(|e| AppError::validation(format!("Invalid plugin patch: {e}")))
    }

    /// A patch that only flips the enabled flag.
    pub fn enabled(enabled: bool) -> Self {
        Self {
            enabled: Some(enabled),
            config: None,
        }
    }

    /// A patch that only replaces the configuration.
    pub fn config(config: Value) -> Self {
        Self {
            enabled: None,
            config: Some(config),
        }
    }

    fn validate(&self) -> AppResult<()> {
        if self.enabled.is_none() && self.config.is_none() {
            return Err(AppError::validation(
                "Plugin patch must set 'enabled' or 'config'",
            ));
        }
        if matches!(self.config, Some(Value::Null)) {
            return Err(AppError::validation("Plugin config must not be null"));
        }
        Ok(())
    }
}

/// Administrative operations over a shared [`PluginManager`].
#[derive(Debug, Clone)]
pub struct PluginAdmin {
    manager: Arc<PluginManager>,
}

impl PluginAdmin {
    /// Creates the admin surface.
    pub fn new(manager: Arc<PluginManager>) -> Self {
        Self { manager }
    }

    /// Lists every plugin with its status.
    pub async fn list(&self) -> Vec<PluginSummary> {
        self.manager.list_plugins().await
    }

    /// Returns one plugin.
    pub async fn get(&self, name: &str) -> AppResult<PluginSummary> {
        Ok(self.manager.summary(name).await?)
    }

    /// Applies `{enabled?, config?}` to one plugin.
    pub async fn patch(&self, name: &str, patch: PluginPatch) -> AppResult<PluginStatus> {
        patch.validate()?;
        let status = self
            .manager
            .patch(name, patch.enabled, patch.config)
            .await?;
        info!(plugin = %name, enabled = status.enabled, "Plugin patched");
        Ok(status)
    }

    /// Removes one plugin.
    pub async fn remove(&self, name: &str) -> AppResult<()> {
        self.manager.unregister(name).await?;
        Ok(())
    }
}
