//! `issuebridge import`

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::commands::{connect, render_summary};
use crate::cli::output::{create_progress_bar, output, truncate, CommandOutput, ProgressBarExt};
use crate::cli::types::ImportArgs;
use crate::domain::models::Config;
use crate::infrastructure::sheets::read_plan_rows;
use crate::services::{ExecutionSummary, ImportOptions, RowImporter, UserResolver};

#[derive(Debug, Serialize)]
pub struct ImportOutput {
    pub file: PathBuf,
    pub project: String,
    pub quarter: String,
    pub dry_run: bool,
    pub summary: ExecutionSummary,
}

impl CommandOutput for ImportOutput {
    fn to_human(&self) -> String {
        let mode = if self.dry_run { " (dry-run)" } else { "" };
        format!(
            "{}\n{}",
            console::style(format!(
                "Import of {} into {} for {}{mode}",
                self.file.display(),
                self.project,
                self.quarter
            ))
            .bold(),
            render_summary(&self.summary)
        )
    }
}

/// Build run options from the command line and configured defaults.
pub fn import_options(args: &ImportArgs, config: &Config) -> ImportOptions {
    let project = args
        .project
        .clone()
        .unwrap_or_else(|| config.import.default_project.clone());
    let mut options = ImportOptions::for_project(project);
    if let Some(quarter) = &args.quarter {
        options.quarter.clone_from(quarter);
    }
    options.only = args.only;
    options.dry_run = args.dry_run;
    options
}

pub async fn execute(args: ImportArgs, config: &Config, json: bool) -> Result<()> {
    let rows = read_plan_rows(&args.file, &config.import.quarter_dod_column)
        .with_context(|| format!("Failed to read planning sheet {}", args.file.display()))?;
    info!(rows = rows.len(), file = %args.file.display(), "Loaded planning sheet");

    let client = connect(config)?;
    let resolver = UserResolver::new(client.clone(), config.resolver.clone());
    let importer = RowImporter::new(client, resolver, config.import.clone());
    let options = import_options(&args, config);

    let resolved = importer
        .prepare(&options)
        .await
        .context("Startup checks failed")?;

    let pb = create_progress_bar(u64::try_from(rows.len()).unwrap_or(u64::MAX), json);
    let mut summary = ExecutionSummary::new();
    for row in &rows {
        pb.set_message(truncate(&row.project_name, 40));
        importer
            .process_row(row, &resolved, &options, &mut summary)
            .await;
        pb.inc(1);
    }
    if summary.has_failures() {
        pb.finish_warning("Import finished with failures");
    } else {
        pb.finish_success("Import finished");
    }
    summary.log();

    output(
        &ImportOutput {
            file: args.file,
            project: options.project,
            quarter: options.quarter,
            dry_run: options.dry_run,
            summary,
        },
        json,
    );
    Ok(())
}
