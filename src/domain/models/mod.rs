//! Domain models.

pub mod config;
pub mod directory;
pub mod input;
pub mod issue;
pub mod project;

pub use config::{Config, CustomFieldIds, ImportConfig, JiraConfig, LoggingConfig, ResolverConfig};
pub use directory::{AccountId, DirectoryEntry, Resolution, ResolutionPath};
pub use input::{PlanRow, PlannedEpic, PlannedProject, PlannedStory, ProjectPlan, SiteRow};
pub use issue::{
    is_custom_field_id, sanitize_summary, CreatedIssue, FieldKey, FieldValue, IssueFields,
    IssueKind, IssueSnapshot,
};
pub use project::{AllowedValue, CreateMeta, FieldMeta, NewProject, ProjectInfo};
