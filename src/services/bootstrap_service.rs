//! Project bootstrap from a YAML plan.
//!
//! Ensures the project exists, then creates its epics and the stories
//! linked to them. Nothing is de-duplicated: running a plan twice creates
//! its epics and stories twice.

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, instrument};

use crate::domain::errors::DomainResult;
use crate::domain::models::{
    FieldKey, FieldValue, IssueFields, NewProject, PlannedEpic, PlannedStory, ProjectInfo,
    ProjectPlan,
};
use crate::domain::ports::IssueTracker;
use crate::services::run_summary::ExecutionSummary;

/// Result of a bootstrap run.
#[derive(Debug, Clone, Serialize)]
pub struct BootstrapReport {
    pub project: ProjectInfo,
    /// Whether the project was created by this run.
    pub project_created: bool,
    pub summary: ExecutionSummary,
}

pub struct ProjectBootstrapper {
    tracker: Arc<dyn IssueTracker>,
    epic_link_field: String,
}

impl ProjectBootstrapper {
    pub fn new(tracker: Arc<dyn IssueTracker>, epic_link_field: impl Into<String>) -> Self {
        Self {
            tracker,
            epic_link_field: epic_link_field.into(),
        }
    }

    /// Apply `plan`. Failing to find or create the project is fatal; epic and
    /// story failures are recorded. Stories of a failed epic are not created.
    #[instrument(skip_all, fields(project = %plan.project.key))]
    pub async fn run(&self, plan: &ProjectPlan) -> DomainResult<BootstrapReport> {
        let (project, project_created) = self.ensure_project(plan).await?;
        let mut summary = ExecutionSummary::new();

        let mut epic_keys = Vec::with_capacity(plan.epics.len());
        for epic in &plan.epics {
            let fields = self.epic_fields(&project.key, epic);
            match self.tracker.create_issue(&fields).await {
                Ok(issue) => {
                    info!(key = %issue.key, summary = %epic.summary, "Created epic");
                    summary.record_created("Epic", &epic.summary, &issue.key);
                    epic_keys.push(Some(issue.key));
                }
                Err(e) => {
                    error!(summary = %epic.summary, error = %e, "Failed to create epic");
                    summary
                        .failed_tasks
                        .push(format!("Epic: {} - {e}", epic.summary));
                    epic_keys.push(None);
                }
            }
        }

        for (epic, key) in plan.epics.iter().zip(&epic_keys) {
            let Some(epic_key) = key else {
                for story in &epic.stories {
                    summary.record_skipped(format!(
                        "Story: {} (epic '{}' was not created)",
                        story.summary, epic.summary
                    ));
                }
                continue;
            };
            for story in &epic.stories {
                let fields = self.story_fields(&project.key, epic_key, story);
                match self.tracker.create_issue(&fields).await {
                    Ok(issue) => {
                        info!(key = %issue.key, epic = %epic_key, "Created story");
                        summary.record_created("Story", &story.summary, &issue.key);
                    }
                    Err(e) => {
                        error!(summary = %story.summary, error = %e, "Failed to create story");
                        summary
                            .failed_tasks
                            .push(format!("Story: {} - {e}", story.summary));
                    }
                }
            }
        }

        Ok(BootstrapReport {
            project,
            project_created,
            summary,
        })
    }

    /// Look the project up, creating it with the caller as lead when absent.
    async fn ensure_project(&self, plan: &ProjectPlan) -> DomainResult<(ProjectInfo, bool)> {
        let planned = &plan.project;
        match self.tracker.project(&planned.key).await {
            Ok(found) => {
                info!(name = %found.name, "Project found");
                return Ok((found, false));
            }
            Err(e) if e.is_not_found() => {
                info!("Project not found, creating it");
            }
            Err(e) => return Err(e),
        }

        let me = self.tracker.myself().await?;
        let created = self
            .tracker
            .create_project(&NewProject {
                key: planned.key.clone(),
                name: planned.name.clone(),
                description: planned.description.clone(),
                project_type_key: planned.project_type_key.clone(),
                template_key: planned.template_key.clone(),
                lead_account_id: me.account_id,
            })
            .await?;
        info!(id = %created.id, "Project created");
        Ok((created, true))
    }

    fn epic_fields(&self, project: &str, epic: &PlannedEpic) -> IssueFields {
        IssueFields::new()
            .with(FieldKey::Project, FieldValue::Key(project.to_string()))
            .with(FieldKey::Summary, FieldValue::Text(epic.summary.clone()))
            .with(FieldKey::Description, FieldValue::Text(epic.description.clone()))
            .with(FieldKey::IssueType, FieldValue::Name("Epic".to_string()))
    }

    fn story_fields(&self, project: &str, epic_key: &str, story: &PlannedStory) -> IssueFields {
        IssueFields::new()
            .with(FieldKey::Project, FieldValue::Key(project.to_string()))
            .with(FieldKey::Summary, FieldValue::Text(story.summary.clone()))
            .with(FieldKey::Description, FieldValue::Text(story.description.clone()))
            .with(FieldKey::IssueType, FieldValue::Name("Story".to_string()))
            .with(
                FieldKey::custom(&self.epic_link_field),
                FieldValue::Text(epic_key.to_string()),
            )
    }
}
