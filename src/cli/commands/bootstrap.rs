//! `issuebridge bootstrap`

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::commands::{connect, render_summary};
use crate::cli::output::{create_spinner, output, CommandOutput, ProgressBarExt};
use crate::cli::types::BootstrapArgs;
use crate::domain::models::Config;
use crate::infrastructure::sheets::load_plan;
use crate::services::{BootstrapReport, ProjectBootstrapper};

impl CommandOutput for BootstrapReport {
    fn to_human(&self) -> String {
        let verb = if self.project_created { "Created" } else { "Using existing" };
        format!(
            "{}\n{}",
            console::style(format!(
                "{verb} project {} ({})",
                self.project.key, self.project.name
            ))
            .bold(),
            render_summary(&self.summary)
        )
    }
}

pub async fn execute(args: BootstrapArgs, config: &Config, json: bool) -> Result<()> {
    let plan = load_plan(&args.plan)
        .with_context(|| format!("Failed to read project plan {}", args.plan.display()))?;
    info!(project = %plan.project.key, epics = plan.epics.len(), "Loaded project plan");

    let client = connect(config)?;
    let bootstrapper = ProjectBootstrapper::new(client, config.import.fields.epic_link.clone());

    let spinner = create_spinner(format!("Bootstrapping {}", plan.project.key), json);
    let report = match bootstrapper.run(&plan).await {
        Ok(report) => report,
        Err(e) => {
            spinner.finish_error("Bootstrap failed");
            return Err(e).context(format!("Failed to set up project {}", plan.project.key));
        }
    };
    if report.summary.has_failures() {
        spinner.finish_warning("Bootstrap finished with failures");
    } else {
        spinner.finish_success("Bootstrap finished");
    }
    report.summary.log();

    output(&report, json);
    Ok(())
}
