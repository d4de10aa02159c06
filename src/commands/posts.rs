//! Enhanced post commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use inkpress_core::error::AppError;
use inkpress_core::result::AppResult;
use inkpress_core::types::content::ContentItem;
use inkpress_plugin::PluginManager;

use crate::output::{self, OutputFormat};

/// Arguments for post commands
#[derive(Debug, Args)]
pub struct PostsArgs {
    /// Post subcommand
    #[command(subcommand)]
    pub command: PostsCommand,
}

/// Post subcommands
#[derive(Debug, Subcommand)]
pub enum PostsCommand {
    /// List every post after enhancement
    List,
    /// Show one post after enhancement
    Show {
        /// Post slug
        slug: String,
    },
}

/// Row in the post table
#[derive(Debug, Serialize, Tabled)]
struct PostRow {
    #[tabled(rename = "Slug")]
    slug: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Tags")]
    tags: String,
    #[tabled(rename = "Extensions")]
    extensions: String,
}

impl From<&ContentItem> for PostRow {
    fn from(item: &ContentItem) -> Self {
        Self {
            slug: item.slug.clone(),
            title: item.title.clone(),
            tags: item.tags.join(", "),
            extensions: item.extensions.keys().cloned().collect::<Vec<_>>().join(", "),
        }
    }
}

/// Execute post commands
pub async fn execute(
    args: &PostsArgs,
    manager: &PluginManager,
    format: OutputFormat,
) -> AppResult<()> {
    match &args.command {
        PostsCommand::List => {
            let posts = manager.enhanced_posts().await?;
            match format {
                OutputFormat::Table => {
                    let rows: Vec<PostRow> = posts.iter().map(PostRow::from).collect();
                    output::print_list(&rows, format);
                }
                OutputFormat::Json => output::print_json(&posts),
            }
        }
        PostsCommand::Show { slug } => {
            let post = manager
                .enhanced_post(slug)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Post '{slug}' not found")))?;
            match format {
                OutputFormat::Table => {
                    println!("{}:", post.title);
                    output::print_kv("Slug", &post.slug);
                    output::print_kv("Tags", &post.tags.join(", "));
                    for (key, value) in &post.extensions {
                        output::print_kv(key, &value.to_string());
                    }
                }
                OutputFormat::Json => output::print_json(&post),
            }
        }
    }

    Ok(())
}
