//! Command-line interface.
//!
//! Thin orchestration over the library: sync a block source, list/search its
//! catalog, and generate a block into a target directory.

use crate::block::{BlockConfig, Catalog};
use crate::config::BlocksmithConfig;
use crate::engine;
use crate::sync::{GitSource, LocalSource, SourceProvider};
use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use comfy_table::Table;
use dialoguer::Confirm;
use owo_colors::OwoColorize;
use serde_json::Value;
use std::path::PathBuf;

/// Blocksmith - project scaffolding from versioned block templates
#[derive(Parser)]
#[command(name = "blocksmith")]
#[command(about = "Project scaffolding from versioned block templates")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (overrides default config loading)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Workspace directory for source checkouts
    #[arg(long, global = true)]
    pub workspace: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (text, json)
    #[arg(long, global = true)]
    pub log_format: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Clone or update the block source repository
    Sync {
        /// Source repository URL (defaults to the configured source)
        #[arg(long)]
        source: Option<String>,
    },
    /// List all blocks in the current source
    List,
    /// Search blocks by keyword and tags
    Search {
        keyword: String,
        /// Restrict to blocks carrying any of these tags
        #[arg(long)]
        tag: Vec<String>,
    },
    /// Render a block into a target directory
    Generate {
        /// Block name as declared in its manifest
        block: String,
        /// Target directory to materialize into
        target: PathBuf,
        /// Data model: inline JSON, or @path to a JSON file
        #[arg(long)]
        model: Option<String>,
        /// Use a local source directory instead of the synced checkout
        #[arg(long)]
        path: Option<PathBuf>,
        /// Skip the confirmation prompt for non-empty targets
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

fn configured_source(
    flag: Option<String>,
    config: &BlocksmithConfig,
) -> anyhow::Result<String> {
    flag.or_else(|| config.source.clone())
        .context("no block source configured; pass --source or set `source` in the config file")
}

fn parse_model(raw: Option<&str>) -> anyhow::Result<Value> {
    match raw {
        None => Ok(Value::Object(Default::default())),
        Some(file) if file.starts_with('@') => {
            let path = &file[1..];
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("cannot read model file {path}"))?;
            serde_json::from_str(&text).with_context(|| format!("invalid JSON in {path}"))
        }
        Some(inline) => serde_json::from_str(inline).context("invalid inline JSON model"),
    }
}

fn block_table(blocks: &[&BlockConfig]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["NAME", "VERSION", "TAGS", "DESCRIPTION"]);
    for block in blocks {
        table.add_row(vec![
            block.name.clone(),
            block.version.clone(),
            block.tags.join(", "),
            block.description.clone(),
        ]);
    }
    table
}

async fn load_catalog(
    cli_workspace: Option<PathBuf>,
    source_flag: Option<String>,
    local_path: Option<PathBuf>,
    config: &BlocksmithConfig,
) -> anyhow::Result<Catalog> {
    let base = match local_path {
        Some(path) => LocalSource::new(path).ensure_base().await?,
        None => {
            let source = configured_source(source_flag, config)?;
            let workspace = cli_workspace.or_else(|| config.workspace.clone());
            GitSource::new(source, workspace)?.ensure_base().await?
        }
    };
    Ok(Catalog::load(&base)?)
}

fn target_is_occupied(target: &std::path::Path) -> bool {
    match std::fs::read_dir(target) {
        Ok(mut entries) => entries.next().is_some(),
        Err(_) => false,
    }
}

/// Execute a parsed command against the loaded configuration.
pub async fn run(cli: Cli, config: BlocksmithConfig) -> anyhow::Result<()> {
    match cli.command {
        Commands::Sync { source } => {
            let source = configured_source(source, &config)?;
            let workspace = cli.workspace.or_else(|| config.workspace.clone());
            let git = GitSource::new(source, workspace)?;
            let report = git.sync().await?;
            println!(
                "{} {} ({:?}) at {}",
                "synced".green(),
                report.source,
                report.action,
                report.finished_at.to_rfc3339()
            );
            Ok(())
        }
        Commands::List => {
            let catalog = load_catalog(cli.workspace, None, None, &config).await?;
            let blocks: Vec<&BlockConfig> = catalog.blocks().iter().collect();
            println!("{}", block_table(&blocks));
            Ok(())
        }
        Commands::Search { keyword, tag } => {
            let catalog = load_catalog(cli.workspace, None, None, &config).await?;
            let matches = catalog.search(&keyword, &tag);
            if matches.is_empty() {
                println!("no blocks match {keyword:?}");
            } else {
                println!("{}", block_table(&matches));
            }
            Ok(())
        }
        Commands::Generate {
            block,
            target,
            model,
            path,
            yes,
        } => {
            let catalog = load_catalog(cli.workspace, None, path, &config).await?;
            let Some(found) = catalog.find(&block) else {
                bail!("block {block:?} not found in source");
            };

            if !yes && target_is_occupied(&target) {
                let proceed = Confirm::new()
                    .with_prompt(format!(
                        "{} is not empty; existing files will be overwritten. Continue?",
                        target.display()
                    ))
                    .default(false)
                    .interact()?;
                if !proceed {
                    bail!("aborted");
                }
            }

            let model = parse_model(model.as_deref())?;
            let render_config = found.render_config(model);
            let rendered = engine::render(&render_config).await?;
            rendered.output(&target).await?;

            let files = rendered
                .rendered()?
                .iter()
                .filter(|n| !n.is_directory())
                .count();
            println!(
                "{} {} v{}: {} file(s) written to {}",
                "generated".green(),
                found.name.bold(),
                found.version,
                files,
                target.display()
            );
            Ok(())
        }
    }
}
