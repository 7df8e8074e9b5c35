//! Blocksmith CLI entry point.

use blocksmith::cli::{self, Cli};
use blocksmith::config::BlocksmithConfig;
use blocksmith::logging;
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = BlocksmithConfig::load(cli.config.as_deref())?;
    logging::init(
        &config.logging,
        cli.log_level.as_deref(),
        cli.log_format.as_deref(),
    )?;

    cli::run(cli, config).await
}
