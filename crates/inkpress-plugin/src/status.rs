//! Status store: enabled flag, effective config, and lifecycle state per plugin.
//!
//! Every mutation happens inside a single write guard, so readers always
//! see either the whole change or none of it.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::PluginError;

/// Lifecycle state of a registered plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginState {
    /// Registered, not yet initialized.
    Registered,
    /// Initializer is running.
    Initializing,
    /// Initialized; hooks and components are live.
    Ready,
    /// Initialization failed, or a dependency is missing or failed.
    Failed,
}

impl std::fmt::Display for PluginState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Registered => write!(f, "registered"),
            Self::Initializing => write!(f, "initializing"),
            Self::Ready => write!(f, "ready"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Runtime state of one plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginStatus {
    /// Plugin name.
    pub name: String,
    /// Whether the plugin's hooks and components are in use.
    pub enabled: bool,
    /// Effective configuration.
    pub config: Value,
    /// Lifecycle state.
    pub state: PluginState,
    /// Time of the last enable/config mutation.
    pub last_updated: DateTime<Utc>,
    /// Last initialization or execution failure.
    pub last_error: Option<String>,
}

impl PluginStatus {
    /// Whether the plugin currently participates in pipeline runs and
    /// component resolution.
    pub fn is_active(&self) -> bool {
        self.enabled && self.state == PluginState::Ready
    }
}

/// Single source of truth for plugin statuses.
#[derive(Debug, Default)]
pub struct StatusStore {
    /// Plugin name → status.
    statuses: RwLock<HashMap<String, PluginStatus>>,
}

impl StatusStore {
    /// Creates a new empty status store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the status of a newly registered plugin.
    pub async fn insert(&self, name: &str, enabled: bool, config: Value) -> PluginStatus {
        let status = PluginStatus {
            name: name.to_string(),
            enabled,
            config,
            state: PluginState::Registered,
            last_updated: Utc::now(),
            last_error: None,
        };
        self.statuses
            .write()
            .await
            .insert(name.to_string(), status.clone());
        status
    }

    /// Removes a plugin's status.
    pub async fn remove(&self, name: &str) -> Option<PluginStatus> {
        self.statuses.write().await.remove(name)
    }

    /// Sets the enabled flag.
    pub async fn set_enabled(&self, name: &str, enabled: bool) -> Result<PluginStatus, PluginError> {
        self.mutate(name, |status| {
            status.enabled = enabled;
            status.last_updated = Utc::now();
        })
        .await
    }

    /// Replaces the effective configuration.
    pub async fn update_config(&self, name: &str, config: Value) -> Result<PluginStatus, PluginError> {
        self.mutate(name, |status| {
            status.config = config;
            status.last_updated = Utc::now();
        })
        .await
    }

    /// Moves the plugin to `state`.
    pub async fn set_state(&self, name: &str, state: PluginState) -> Result<PluginStatus, PluginError> {
        self.mutate(name, |status| status.state = state).await
    }

    /// Marks the plugin ready and clears its last error.
    pub async fn mark_ready(&self, name: &str) -> Result<PluginStatus, PluginError> {
        self.mutate(name, |status| {
            status.state = PluginState::Ready;
            status.last_error = None;
        })
        .await
    }

    /// Marks the plugin failed and records why.
    pub async fn mark_failed(&self, name: &str, error: &PluginError) -> Result<PluginStatus, PluginError> {
        let message = error.to_string();
        self.mutate(name, |status| {
            status.state = PluginState::Failed;
            status.last_error = Some(message);
        })
        .await
    }

    /// Records a failure without changing the lifecycle state.
    ///
    /// Silently ignored if the plugin was unregistered in the meantime.
    pub async fn record_error(&self, name: &str, error: &PluginError) {
        let message = error.to_string();
        let _ = self
            .mutate(name, |status| status.last_error = Some(message))
            .await;
    }

    /// Clears the last recorded failure.
    pub async fn clear_error(&self, name: &str) {
        let _ = self.mutate(name, |status| status.last_error = None).await;
    }

    /// Returns a snapshot of one status.
    pub async fn get(&self, name: &str) -> Result<PluginStatus, PluginError> {
        self.statuses
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| PluginError::PluginNotFound(name.to_string()))
    }

    /// Returns a consistent snapshot of every status, taken under one guard.
    pub async fn snapshot(&self) -> HashMap<String, PluginStatus> {
        self.statuses.read().await.clone()
    }

    /// Returns every status, sorted by name.
    pub async fn all(&self) -> Vec<PluginStatus> {
        let mut statuses: Vec<PluginStatus> = self.statuses.read().await.values().cloned().collect();
        statuses.sort_by(|a, b| a.name.cmp(&b.name));
        statuses
    }

    async fn mutate<F>(&self, name: &str, apply: F) -> Result<PluginStatus, PluginError>
    where
        F: FnOnce(&mut PluginStatus),
    {
        let mut statuses = self.statuses.write().await;
        let status = statuses
            .get_mut(name)
            .ok_or_else(|| PluginError::PluginNotFound(name.to_string()))?;
        apply(status);
        Ok(status.clone())
    }
}
