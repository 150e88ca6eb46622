//! Issue tracker port.
//!
//! Covers the handful of tracker operations the importers need: identity,
//! projects, create metadata, and issue create/search/update. Every call is
//! independent; nothing here is transactional.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{
    CreateMeta, CreatedIssue, DirectoryEntry, IssueFields, IssueSnapshot, NewProject,
    ProjectInfo,
};

#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// The authenticated account.
    async fn myself(&self) -> DomainResult<DirectoryEntry>;

    /// Look up a project by key. Missing projects yield `NotFound`.
    async fn project(&self, key: &str) -> DomainResult<ProjectInfo>;

    async fn create_project(&self, project: &NewProject) -> DomainResult<ProjectInfo>;

    /// Create-screen metadata for one issue type of one project.
    async fn create_meta(&self, project_key: &str, issue_type: &str) -> DomainResult<CreateMeta>;

    async fn create_issue(&self, fields: &IssueFields) -> DomainResult<CreatedIssue>;

    async fn update_issue(&self, key: &str, fields: &IssueFields) -> DomainResult<()>;

    /// Run a JQL query, returning matching issues with the requested fields.
    async fn search_issues(
        &self,
        jql: &str,
        max_results: usize,
        fields: &[&str],
    ) -> DomainResult<Vec<IssueSnapshot>>;
}
