//! Plugin administration commands.

use std::sync::Arc;

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use inkpress_core::error::AppError;
use inkpress_core::result::AppResult;
use inkpress_plugin::{PluginAdmin, PluginManager, PluginPatch, PluginStatus, PluginSummary};

use crate::output::{self, OutputFormat};

/// Arguments for plugin commands
#[derive(Debug, Args)]
pub struct PluginsArgs {
    /// Plugin subcommand
    #[command(subcommand)]
    pub command: PluginsCommand,
}

/// Plugin subcommands
#[derive(Debug, Subcommand)]
pub enum PluginsCommand {
    /// List plugins with their status
    List,
    /// Show one plugin
    Show {
        /// Plugin name
        name: String,
    },
    /// Enable a plugin
    Enable {
        /// Plugin name
        name: String,
    },
    /// Disable a plugin
    Disable {
        /// Plugin name
        name: String,
    },
    /// Replace a plugin's configuration
    Configure {
        /// Plugin name
        name: String,
        /// New configuration as a JSON object
        config: String,
    },
    /// Apply a JSON patch body: {"enabled": bool?, "config": object?}
    Patch {
        /// Plugin name
        name: String,
        /// Patch body
        body: String,
    },
    /// Remove a plugin
    Remove {
        /// Plugin name
        name: String,
    },
}

/// Row in the plugin table
#[derive(Debug, Serialize, Tabled)]
struct PluginRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Enabled")]
    enabled: bool,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Depends On")]
    dependencies: String,
    #[tabled(rename = "Transforms")]
    transforms: usize,
    #[tabled(rename = "Components")]
    components: String,
    #[tabled(rename = "Last Error")]
    last_error: String,
}

impl From<&PluginSummary> for PluginRow {
    fn from(summary: &PluginSummary) -> Self {
        Self {
            name: summary.descriptor.name.clone(),
            version: summary.descriptor.version.clone(),
            enabled: summary.status.enabled,
            state: summary.status.state.to_string(),
            dependencies: summary.descriptor.dependencies.join(", "),
            transforms: summary.hooks.transforms,
            components: summary.hooks.components.join(", "),
            last_error: summary.status.last_error.clone().unwrap_or_default(),
        }
    }
}

/// Execute plugin commands
pub async fn execute(
    args: &PluginsArgs,
    manager: Arc<PluginManager>,
    format: OutputFormat,
) -> AppResult<()> {
    let admin = PluginAdmin::new(manager);

    match &args.command {
        PluginsCommand::List => {
            let summaries = admin.list().await;
            match format {
                OutputFormat::Table => {
                    let rows: Vec<PluginRow> = summaries.iter().map(PluginRow::from).collect();
                    output::print_list(&rows, format);
                }
                OutputFormat::Json => output::print_json(&summaries),
            }
        }
        PluginsCommand::Show { name } => {
            let summary = admin.get(name).await?;
            match format {
                OutputFormat::Table => print_summary(&summary),
                OutputFormat::Json => output::print_json(&summary),
            }
        }
        PluginsCommand::Enable { name } => {
            let status = admin.patch(name, PluginPatch::enabled(true)).await?;
            print_status(&status, format, &format!("Plugin '{name}' enabled"));
        }
        PluginsCommand::Disable { name } => {
            let status = admin.patch(name, PluginPatch::enabled(false)).await?;
            print_status(&status, format, &format!("Plugin '{name}' disabled"));
        }
        PluginsCommand::Configure { name, config } => {
            let config = serde_json::from_str(config)
                .map_err(|e| AppError::validation(format!("Invalid JSON config: {e}")))?;
            let status = admin.patch(name, PluginPatch::config(config)).await?;
            print_status(&status, format, &format!("Plugin '{name}' configured"));
        }
        PluginsCommand::Patch { name, body } => {
            let patch = PluginPatch::parse(body)?;
            let status = admin.patch(name, patch).await?;
            print_status(&status, format, &format!("Plugin '{name}' patched"));
        }
        PluginsCommand::Remove { name } => {
            admin.remove(name).await?;
            output::print_success(&format!("Plugin '{name}' removed"));
        }
    }

    Ok(())
}

fn print_summary(summary: &PluginSummary) {
    let descriptor = &summary.descriptor;
    let status = &summary.status;

    println!("Plugin {}:", descriptor.name);
    output::print_kv("Version", &descriptor.version);
    output::print_kv("Description", &descriptor.description);
    output::print_kv("Author", &descriptor.author);
    output::print_kv("Depends On", &descriptor.dependencies.join(", "));
    output::print_kv("Enabled", &status.enabled.to_string());
    output::print_kv("State", &status.state.to_string());
    output::print_kv("Config", &status.config.to_string());
    output::print_kv("Last Updated", &status.last_updated.to_rfc3339());
    output::print_kv("Transforms", &summary.hooks.transforms.to_string());
    output::print_kv("Components", &summary.hooks.components.join(", "));
    if let Some(error) = &status.last_error {
        output::print_warning(error);
    }
}

fn print_status(status: &PluginStatus, format: OutputFormat, message: &str) {
    match format {
        OutputFormat::Table => {
            output::print_success(message);
            if let Some(error) = &status.last_error {
                output::print_warning(error);
            }
        }
        OutputFormat::Json => output::print_json(status),
    }
}
