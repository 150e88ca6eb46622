//! In-memory port doubles shared by the service tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    AllowedValue, CreateMeta, CreatedIssue, DirectoryEntry, FieldKey, FieldMeta, FieldValue,
    IssueFields, IssueSnapshot, NewProject, ProjectInfo,
};
use crate::domain::ports::{IssueTracker, UserDirectory};

/// Tracker double recording every write.
#[derive(Default)]
pub struct FakeTracker {
    pub me: Option<DirectoryEntry>,
    pub projects: Mutex<HashMap<String, ProjectInfo>>,
    pub metas: HashMap<(String, String), CreateMeta>,
    pub existing: Vec<IssueSnapshot>,
    pub fail_search: bool,
    /// Summaries whose creation is rejected with a 400.
    pub reject_summaries: Vec<String>,

    pub created: Mutex<Vec<IssueFields>>,
    pub updated: Mutex<Vec<(String, IssueFields)>>,
    pub created_projects: Mutex<Vec<NewProject>>,
    pub searches: Mutex<Vec<String>>,
    pub meta_calls: AtomicUsize,
    pub next_id: AtomicUsize,
}

impl FakeTracker {
    pub fn with_me(mut self, entry: DirectoryEntry) -> Self {
        self.me = Some(entry);
        self
    }

    pub fn with_project(self, key: &str) -> Self {
        self.projects.lock().unwrap().insert(
            key.to_string(),
            ProjectInfo {
                id: "10000".to_string(),
                key: key.to_string(),
                name: format!("{key} project"),
            },
        );
        self
    }

    /// Register a select-list field with the given option values; ids are `"{field}:{value}"`.
    pub fn with_options(mut self, project: &str, issue_type: &str, field_id: &str, values: &[&str]) -> Self {
        let meta = self
            .metas
            .entry((project.to_string(), issue_type.to_string()))
            .or_insert_with(|| CreateMeta {
                project_key: project.to_string(),
                issue_type: issue_type.to_string(),
                fields: Vec::new(),
            });
        meta.fields.push(FieldMeta {
            field_id: field_id.to_string(),
            name: field_id.to_string(),
            required: false,
            allowed_values: values
                .iter()
                .map(|v| AllowedValue {
                    id: format!("{field_id}:{v}"),
                    value: (*v).to_string(),
                })
                .collect(),
        });
        self
    }

    pub fn with_existing(mut self, key: &str, fields: Value) -> Self {
        let Value::Object(fields) = fields else {
            panic!("existing issue fields must be an object");
        };
        self.existing.push(IssueSnapshot {
            key: key.to_string(),
            fields,
        });
        self
    }

    pub fn created(&self) -> Vec<IssueFields> {
        self.created.lock().unwrap().clone()
    }

    pub fn updated(&self) -> Vec<(String, IssueFields)> {
        self.updated.lock().unwrap().clone()
    }

    pub fn searches(&self) -> Vec<String> {
        self.searches.lock().unwrap().clone()
    }
}

#[async_trait]
impl IssueTracker for FakeTracker {
    async fn myself(&self) -> DomainResult<DirectoryEntry> {
        self.me
            .clone()
            .ok_or_else(|| DomainError::Unauthorized("401 Unauthorized".to_string()))
    }

    async fn project(&self, key: &str) -> DomainResult<ProjectInfo> {
        self.projects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| DomainError::NotFound(format!("project {key}")))
    }

    async fn create_project(&self, project: &NewProject) -> DomainResult<ProjectInfo> {
        self.created_projects.lock().unwrap().push(project.clone());
        let info = ProjectInfo {
            id: "10010".to_string(),
            key: project.key.clone(),
            name: project.name.clone(),
        };
        self.projects
            .lock()
            .unwrap()
            .insert(project.key.clone(), info.clone());
        Ok(info)
    }

    async fn create_meta(&self, project_key: &str, issue_type: &str) -> DomainResult<CreateMeta> {
        self.meta_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .metas
            .get(&(project_key.to_string(), issue_type.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn create_issue(&self, fields: &IssueFields) -> DomainResult<CreatedIssue> {
        fields.validate_for_create()?;
        if let Some(FieldValue::Text(summary)) = fields.get(&FieldKey::Summary) {
            if self.reject_summaries.contains(summary) {
                return Err(DomainError::UnexpectedStatus {
                    status: 400,
                    body: "Field 'customfield_10257' is invalid".to_string(),
                });
            }
        }
        let project = match fields.get(&FieldKey::Project) {
            Some(FieldValue::Key(k)) => k.clone(),
            _ => "NEW".to_string(),
        };
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.created.lock().unwrap().push(fields.clone());
        Ok(CreatedIssue {
            id: (10_000 + n).to_string(),
            key: format!("{project}-{n}"),
        })
    }

    async fn update_issue(&self, key: &str, fields: &IssueFields) -> DomainResult<()> {
        self.updated
            .lock()
            .unwrap()
            .push((key.to_string(), fields.clone()));
        Ok(())
    }

    async fn search_issues(
        &self,
        jql: &str,
        max_results: usize,
        _fields: &[&str],
    ) -> DomainResult<Vec<IssueSnapshot>> {
        self.searches.lock().unwrap().push(jql.to_string());
        if self.fail_search {
            return Err(DomainError::UnexpectedStatus {
                status: 400,
                body: "Error in the JQL Query".to_string(),
            });
        }
        Ok(self
            .existing
            .iter()
            .filter(|issue| {
                issue
                    .fields
                    .get("summary")
                    .and_then(Value::as_str)
                    .is_some_and(|s| jql.contains(&format!("summary ~ \"{s}\"")))
            })
            .take(max_results)
            .cloned()
            .collect())
    }
}

/// Directory double answering exact display-name or username queries only.
#[derive(Default)]
pub struct FakeDirectory {
    pub entries: Vec<DirectoryEntry>,
}

impl FakeDirectory {
    pub fn new(entries: Vec<DirectoryEntry>) -> Self {
        Self { entries }
    }
}

#[async_trait]
impl UserDirectory for FakeDirectory {
    async fn search_users(
        &self,
        query: &str,
        max_results: usize,
    ) -> DomainResult<Vec<DirectoryEntry>> {
        if max_results == 1 {
            // email-pattern lookups never hit
            return Ok(Vec::new());
        }
        Ok(self
            .entries
            .iter()
            .filter(|e| e.display_name == query || e.username == query)
            .take(max_results)
            .cloned()
            .collect())
    }
}
