//! Project and field-metadata models.

use serde::{Deserialize, Serialize};

use crate::domain::models::directory::AccountId;

/// A tracker project as seen by the authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub id: String,
    pub key: String,
    pub name: String,
}

/// Parameters for creating a new project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProject {
    pub key: String,
    pub name: String,
    pub description: String,
    pub project_type_key: String,
    pub template_key: String,
    pub lead_account_id: AccountId,
}

/// One selectable option of a select-list field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedValue {
    pub id: String,
    pub value: String,
}

/// Create-screen metadata for one field of one issue type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMeta {
    pub field_id: String,
    pub name: String,
    pub required: bool,
    pub allowed_values: Vec<AllowedValue>,
}

/// Create-screen metadata for an issue type in a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateMeta {
    pub project_key: String,
    pub issue_type: String,
    pub fields: Vec<FieldMeta>,
}

impl CreateMeta {
    pub fn field(&self, field_id: &str) -> Option<&FieldMeta> {
        self.fields.iter().find(|f| f.field_id == field_id)
    }
}
