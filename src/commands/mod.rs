//! CLI command definitions and dispatch.

pub mod components;
pub mod plugins;
pub mod posts;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{info, warn};

use inkpress_content::JsonFileContentProvider;
use inkpress_core::config::AppConfig;
use inkpress_core::result::AppResult;
use inkpress_plugin::{Plugin, PluginManager};
use plugin_comments::CommentsPlugin;
use plugin_enrichment::{ReadingTimePlugin, TagNormalizerPlugin};

use crate::output::OutputFormat;

/// Inkpress: plugin-driven content runtime
#[derive(Debug, Parser)]
#[command(name = "inkpress", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Plugin administration
    Plugins(plugins::PluginsArgs),
    /// Enhanced post reads
    Posts(posts::PostsArgs),
    /// UI extension points
    Components(components::ComponentsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> AppResult<()> {
        let manager = build_manager(&config).await?;

        match &self.command {
            Commands::Plugins(args) => plugins::execute(args, manager, self.format).await,
            Commands::Posts(args) => posts::execute(args, &manager, self.format).await,
            Commands::Components(args) => components::execute(args, &manager, self.format).await,
        }
    }
}

/// Plugins shipped with Inkpress, in registration order.
pub fn first_party_plugins() -> Vec<Arc<dyn Plugin>> {
    vec![
        Arc::new(TagNormalizerPlugin::new()),
        Arc::new(ReadingTimePlugin::new()),
        Arc::new(CommentsPlugin::new()),
    ]
}

/// Builds the manager, registers the first-party plugins and initializes
/// them. Plugins that fail to initialize are logged and left `failed`.
pub async fn build_manager(config: &AppConfig) -> AppResult<Arc<PluginManager>> {
    let content = Arc::new(JsonFileContentProvider::new(&config.content.posts_path));
    let manager = PluginManager::new(config.plugins.clone(), content);

    for plugin in first_party_plugins() {
        manager.register(plugin).await?;
    }

    let report = manager.initialize_all().await?;
    for failed in &report.failed {
        warn!(plugin = %failed.name, error = %failed.error, "Plugin not ready");
    }
    info!(
        content = manager.content_provider(),
        ready = report.ready.len(),
        failed = report.failed.len(),
        "Plugin runtime ready"
    );

    Ok(Arc::new(manager))
}
