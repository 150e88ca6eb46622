//! `issuebridge subtasks`

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::commands::{connect, render_summary};
use crate::cli::output::{create_spinner, output, CommandOutput, ProgressBarExt};
use crate::cli::types::SubtasksArgs;
use crate::domain::models::Config;
use crate::infrastructure::sheets::read_site_rows;
use crate::services::{ExecutionSummary, SubtaskImporter};

#[derive(Debug, Serialize)]
pub struct SubtasksOutput {
    pub project: String,
    pub parent: String,
    pub summary: ExecutionSummary,
}

impl CommandOutput for SubtasksOutput {
    fn to_human(&self) -> String {
        format!(
            "{}\n{}",
            console::style(format!("Sub-tasks of {} in {}", self.parent, self.project)).bold(),
            render_summary(&self.summary)
        )
    }
}

pub async fn execute(args: SubtasksArgs, config: &Config, json: bool) -> Result<()> {
    let sites = read_site_rows(&args.file)
        .with_context(|| format!("Failed to read site sheet {}", args.file.display()))?;
    info!(sites = sites.len(), "Loaded site sheet");

    let client = connect(config)?;
    let project = args
        .project
        .unwrap_or_else(|| config.import.default_project.clone());

    let spinner = create_spinner(format!("Creating {} sub-task(s)", sites.len()), json);
    let summary = SubtaskImporter::new(client)
        .run(&project, &args.parent, &sites)
        .await;
    if summary.has_failures() {
        spinner.finish_warning("Some sub-tasks failed");
    } else {
        spinner.finish_success("Sub-tasks created");
    }
    summary.log();

    output(
        &SubtasksOutput {
            project,
            parent: args.parent,
            summary,
        },
        json,
    );
    Ok(())
}
