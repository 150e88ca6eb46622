//! Create-screen metadata lookups.
//!
//! Select-list custom fields must be set by option id; the catalog turns a
//! human-readable option value into that id. Metadata is fetched once per
//! project and issue type and reused for the life of the catalog.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{CreateMeta, FieldValue};
use crate::domain::ports::IssueTracker;

pub struct FieldCatalog {
    tracker: Arc<dyn IssueTracker>,
    cache: Mutex<HashMap<(String, String), CreateMeta>>,
}

impl FieldCatalog {
    pub fn new(tracker: Arc<dyn IssueTracker>) -> Self {
        Self {
            tracker,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Create metadata for `issue_type` in `project`, cached after the first fetch.
    pub async fn meta(&self, project: &str, issue_type: &str) -> DomainResult<CreateMeta> {
        let key = (project.to_string(), issue_type.to_string());
        let mut cache = self.cache.lock().await;
        if let Some(meta) = cache.get(&key) {
            return Ok(meta.clone());
        }

        debug!(project, issue_type, "Fetching create metadata");
        let meta = self.tracker.create_meta(project, issue_type).await?;
        cache.insert(key, meta.clone());
        Ok(meta)
    }

    /// Option id for `value` of select field `field_id`, matched case-insensitively.
    ///
    /// Fails with [`DomainError::ValidationFailed`] listing the allowed values
    /// when nothing matches.
    pub async fn allowed_value_id(
        &self,
        field_id: &str,
        value: &str,
        project: &str,
        issue_type: &str,
    ) -> DomainResult<FieldValue> {
        let meta = self.meta(project, issue_type).await?;
        let allowed = meta
            .field(field_id)
            .map(|f| f.allowed_values.as_slice())
            .unwrap_or_default();

        let wanted = value.to_lowercase();
        if let Some(found) = allowed.iter().find(|v| v.value.to_lowercase() == wanted) {
            debug!(field_id, value, id = %found.id, "Resolved allowed value");
            return Ok(FieldValue::Id(found.id.clone()));
        }

        let names: Vec<&str> = allowed.iter().map(|v| v.value.as_str()).collect();
        Err(DomainError::ValidationFailed(format!(
            "Value '{value}' not found for field '{field_id}' in {project}/{issue_type}. Allowed values: [{}]",
            names.join(", ")
        )))
    }
}
