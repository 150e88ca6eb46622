//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::domain::models::IssueKind;

#[derive(Parser, Debug)]
#[command(name = "issuebridge")]
#[command(about = "Import planning spreadsheets into Jira", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (replaces .issuebridge/config.yaml and local.yaml)
    #[arg(short, long, global = true, env = "ISSUEBRIDGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve a name, username or email to a Jira account id
    Resolve(ResolveArgs),

    /// Verify the configured credentials
    Whoami,

    /// Import a quarterly planning sheet
    Import(ImportArgs),

    /// Create deployment sub-tasks from a site sheet
    Subtasks(SubtasksArgs),

    /// Create a project with its epics and stories from a YAML plan
    Bootstrap(BootstrapArgs),
}

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Display name, username or email address
    pub query: String,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Planning sheet (CSV)
    pub file: PathBuf,

    /// Target project key (defaults to import.default_project)
    #[arg(short, long)]
    pub project: Option<String>,

    /// Planning quarter (defaults to the quarter after the current one)
    #[arg(short, long, value_parser = ["Q1", "Q2", "Q3", "Q4"])]
    pub quarter: Option<String>,

    /// Process only rows of this issue type
    #[arg(long)]
    pub only: Option<IssueKind>,

    /// Validate and log field sets without creating or updating issues
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct SubtasksArgs {
    /// Site sheet (CSV: SITE_NAME, CPU, MEM, STORAGE)
    pub file: PathBuf,

    /// Parent issue key
    #[arg(long)]
    pub parent: String,

    /// Project key (defaults to import.default_project)
    #[arg(short, long)]
    pub project: Option<String>,
}

#[derive(Args, Debug)]
pub struct BootstrapArgs {
    /// Project plan (YAML)
    pub plan: PathBuf,
}
