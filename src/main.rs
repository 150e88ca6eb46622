//! issuebridge CLI entry point.

use anyhow::{Context, Result};
use clap::Parser;

use issuebridge::cli::{commands, handle_error, Cli};
use issuebridge::infrastructure::config::ConfigLoader;
use issuebridge::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    let json = cli.json;

    if let Err(err) = run(cli).await {
        handle_error(err, json);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };

    let log_config = LogConfig::from_settings(&config.logging, cli.verbose)
        .context("Invalid logging configuration")?;
    let _logger = LoggerImpl::init(&log_config)?;

    commands::dispatch(cli.command, &config, cli.json).await
}
