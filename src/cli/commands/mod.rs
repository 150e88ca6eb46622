//! Command handlers.
//!
//! Each handler builds what it needs from the loaded [`Config`], runs its
//! service and prints a [`CommandOutput`](crate::cli::output::CommandOutput).

pub mod bootstrap;
pub mod import;
pub mod resolve;
pub mod subtasks;
pub mod whoami;

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::adapters::jira::JiraClient;
use crate::cli::output::TableFormatter;
use crate::cli::types::Commands;
use crate::domain::models::Config;
use crate::services::ExecutionSummary;

/// Run `command` against the configured tracker.
pub async fn dispatch(command: Commands, config: &Config, json: bool) -> Result<()> {
    match command {
        Commands::Resolve(args) => resolve::execute(args, config, json).await,
        Commands::Whoami => whoami::execute(config, json).await,
        Commands::Import(args) => import::execute(args, config, json).await,
        Commands::Subtasks(args) => subtasks::execute(args, config, json).await,
        Commands::Bootstrap(args) => bootstrap::execute(args, config, json).await,
    }
}

pub(crate) fn connect(config: &Config) -> Result<Arc<JiraClient>> {
    let client = JiraClient::from_config(config).context("Failed to configure the Jira client")?;
    Ok(Arc::new(client))
}

/// Summary table followed by a one-line verdict.
pub(crate) fn render_summary(summary: &ExecutionSummary) -> String {
    if summary.sections().is_empty() {
        return "Nothing to do.".to_string();
    }

    let table = TableFormatter::new().format_summary(summary);
    let failures =
        summary.failed_tasks.len() + summary.failed_users.len() + summary.failed_fields.len();
    let verdict = if failures == 0 {
        console::style("All tasks completed successfully!".to_string()).green()
    } else {
        console::style(format!("{failures} failure(s), see above")).red()
    };
    format!("{table}\n{verdict}")
}
