//! Site-sheet sub-task import.

use std::sync::Arc;

use tracing::{error, info, instrument};

use crate::domain::errors::DomainError;
use crate::domain::models::{FieldKey, FieldValue, IssueFields, SiteRow};
use crate::domain::ports::IssueTracker;
use crate::services::run_summary::ExecutionSummary;

/// Creates one deployment sub-task per site under a parent issue.
pub struct SubtaskImporter {
    tracker: Arc<dyn IssueTracker>,
}

impl SubtaskImporter {
    pub fn new(tracker: Arc<dyn IssueTracker>) -> Self {
        Self { tracker }
    }

    pub fn subtask_fields(project: &str, parent: &str, site: &SiteRow) -> IssueFields {
        IssueFields::new()
            .with(FieldKey::Project, FieldValue::Key(project.to_string()))
            .with(FieldKey::Parent, FieldValue::Key(parent.to_string()))
            .with(FieldKey::Summary, FieldValue::Text(site.summary()))
            .with(FieldKey::IssueType, FieldValue::Name("Sub-task".to_string()))
    }

    /// Create a sub-task for every site. A failed or incomplete site is
    /// recorded and the run moves on to the next one.
    #[instrument(skip(self, sites), fields(sites = sites.len()))]
    pub async fn run(&self, project: &str, parent: &str, sites: &[SiteRow]) -> ExecutionSummary {
        let mut summary = ExecutionSummary::new();
        for site in sites {
            let row = site.row_number;
            let missing = site.missing_columns();
            if !missing.is_empty() {
                let e = DomainError::InputError(format!("missing {}", missing.join(", ")));
                error!(row, site = %site.site_name, error = %e, "Incomplete site row");
                summary.fail_task(row, &site.site_name, e);
                continue;
            }
            let fields = Self::subtask_fields(project, parent, site);
            match self.tracker.create_issue(&fields).await {
                Ok(issue) => {
                    info!(site = %site.site_name, key = %issue.key, "Sub-task created");
                    summary.record_created("Sub-task", &site.site_name, &issue.key);
                }
                Err(e) => {
                    error!(site = %site.site_name, error = %e, "Failed to create sub-task");
                    summary.fail_task(row, &site.site_name, e);
                }
            }
        }
        summary
    }
}
