//! Extension point commands.

use clap::{Args, Subcommand};

use inkpress_core::result::AppResult;
use inkpress_plugin::{PluginManager, Resolution};

use crate::output::{self, OutputFormat};

/// Arguments for component commands
#[derive(Debug, Args)]
pub struct ComponentsArgs {
    /// Component subcommand
    #[command(subcommand)]
    pub command: ComponentsCommand,
}

/// Component subcommands
#[derive(Debug, Subcommand)]
pub enum ComponentsCommand {
    /// Resolve an extension point, loading deferred providers
    Resolve {
        /// Extension point name, e.g. CommentsSection
        point: String,
    },
}

/// Execute component commands
pub async fn execute(
    args: &ComponentsArgs,
    manager: &PluginManager,
    format: OutputFormat,
) -> AppResult<()> {
    match &args.command {
        ComponentsCommand::Resolve { point } => {
            let resolution = manager.resolve_component(point).await;
            let deferred = matches!(resolution, Resolution::Deferred(_));

            match resolution.materialize(manager.component_timeout()).await? {
                Some(descriptor) => match format {
                    OutputFormat::Table => {
                        println!("{point}:");
                        output::print_kv("Component", &descriptor.component);
                        output::print_kv("Deferred", &deferred.to_string());
                        output::print_kv("Props", &descriptor.props.to_string());
                    }
                    OutputFormat::Json => output::print_json(&descriptor),
                },
                None => match format {
                    OutputFormat::Table => {
                        output::print_warning(&format!("No provider for '{point}'"))
                    }
                    OutputFormat::Json => output::print_json(&serde_json::Value::Null),
                },
            }
        }
    }

    Ok(())
}
