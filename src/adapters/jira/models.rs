//! Jira REST API request and response models.
//!
//! These structs map to the Jira REST v2/v3 JSON payloads. They are used
//! internally by the Jira adapter and converted to domain models at the
//! client boundary.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::domain::models::{
    AllowedValue, CreateMeta, DirectoryEntry, FieldMeta, IssueFields, IssueSnapshot, ProjectInfo,
};

/// An account returned by `user/search` or `myself`.
///
/// Jira Cloud omits `name`; Jira Server/DC omits `accountId`. Email may be
/// hidden by profile visibility settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraUser {
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email_address: Option<String>,
}

impl JiraUser {
    /// Convert to a directory entry; accounts without an id are unusable.
    pub fn into_entry(self) -> Option<DirectoryEntry> {
        let account_id = self.account_id.filter(|id| !id.is_empty())?;
        Some(DirectoryEntry::new(
            self.name.unwrap_or_default(),
            self.display_name.unwrap_or_default(),
            self.email_address.unwrap_or_default(),
            account_id,
        ))
    }
}

/// A project returned by `project/{key}` or `POST project`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraProject {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub key: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl From<JiraProject> for ProjectInfo {
    fn from(p: JiraProject) -> Self {
        Self {
            id: p.id,
            name: p.name.unwrap_or_else(|| p.key.clone()),
            key: p.key,
        }
    }
}

/// Request body for `POST /rest/api/3/project`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraCreateProjectRequest {
    pub key: String,
    pub name: String,
    pub project_type_key: String,
    pub project_template_key: String,
    pub description: String,
    pub lead_account_id: String,
    pub assignee_type: String,
}

/// Request body for create and update issue calls.
#[derive(Debug, Clone, Serialize)]
pub struct JiraIssueRequest<'a> {
    pub fields: &'a IssueFields,
}

/// Response from `POST /rest/api/2/issue`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraCreateIssueResponse {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub key: String,
}

/// Request body for `POST /rest/api/2/search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraSearchRequest {
    pub jql: String,
    pub max_results: usize,
    pub fields: Vec<String>,
}

/// Response from `POST /rest/api/2/search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraSearchResponse {
    #[serde(default)]
    pub issues: Vec<JiraIssue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraIssue {
    pub key: String,
    #[serde(default)]
    pub fields: serde_json::Map<String, Value>,
}

impl From<JiraIssue> for IssueSnapshot {
    fn from(issue: JiraIssue) -> Self {
        Self {
            key: issue.key,
            fields: issue.fields,
        }
    }
}

/// Response from `GET /rest/api/2/issue/createmeta?expand=projects.issuetypes.fields`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraCreateMetaResponse {
    #[serde(default)]
    pub projects: Vec<JiraMetaProject>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraMetaProject {
    pub key: String,
    #[serde(default)]
    pub issuetypes: Vec<JiraMetaIssueType>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraMetaIssueType {
    pub name: String,
    #[serde(default)]
    pub fields: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraFieldMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub allowed_values: Vec<JiraAllowedValue>,
}

/// An option of a select-list field. Options carry `value`; issue types,
/// priorities and versions carry `name` instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraAllowedValue {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl JiraCreateMetaResponse {
    /// Flatten the metadata of every project/issue type pair into one view.
    ///
    /// Field entries that fail to parse are skipped.
    pub fn into_domain(self, project_key: &str, issue_type: &str) -> CreateMeta {
        let mut fields: Vec<FieldMeta> = Vec::new();
        for project in self.projects {
            for it in project.issuetypes {
                for (field_id, raw) in it.fields {
                    if fields.iter().any(|f| f.field_id == field_id) {
                        continue;
                    }
                    let Ok(meta) = serde_json::from_value::<JiraFieldMeta>(raw) else {
                        tracing::debug!(field = %field_id, "Skipping unparseable field metadata");
                        continue;
                    };
                    fields.push(FieldMeta {
                        field_id,
                        name: meta.name,
                        required: meta.required,
                        allowed_values: meta
                            .allowed_values
                            .into_iter()
                            .filter_map(|v| {
                                let value = v.value.or(v.name)?;
                                Some(AllowedValue { id: v.id, value })
                            })
                            .collect(),
                    });
                }
            }
        }
        CreateMeta {
            project_key: project_key.to_string(),
            issue_type: issue_type.to_string(),
            fields,
        }
    }
}

/// Jira returns some ids as strings and others as numbers.
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cloud_user_deserialization() {
        let json = r#"{
            "self": "https://example.atlassian.net/rest/api/2/user?accountId=5b10a",
            "accountId": "5b10a",
            "accountType": "atlassian",
            "emailAddress": "jane.doe@example.com",
            "displayName": "Jane Doe",
            "active": true
        }"#;
        let user: JiraUser = serde_json::from_str(json).unwrap();
        let entry = user.into_entry().unwrap();
        assert_eq!(entry.account_id.as_str(), "5b10a");
        assert_eq!(entry.display_name, "Jane Doe");
        assert_eq!(entry.username, "");
    }

    #[test]
    fn test_user_without_account_id_is_dropped() {
        let json = r#"{ "name": "jdoe", "displayName": "Jane Doe" }"#;
        let user: JiraUser = serde_json::from_str(json).unwrap();
        assert!(user.into_entry().is_none());
    }

    #[test]
    fn test_project_numeric_id() {
        let json = r#"{ "self": "x", "id": 10010, "key": "AZAI" }"#;
        let project: JiraProject = serde_json::from_str(json).unwrap();
        let info = ProjectInfo::from(project);
        assert_eq!(info.id, "10010");
        assert_eq!(info.name, "AZAI");
    }

    #[test]
    fn test_create_project_request_is_camel_case() {
        let req = JiraCreateProjectRequest {
            key: "AZAI".to_string(),
            name: "Azure AI".to_string(),
            project_type_key: "software".to_string(),
            project_template_key: "tmpl".to_string(),
            description: String::new(),
            lead_account_id: "abc".to_string(),
            assignee_type: "PROJECT_LEAD".to_string(),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["leadAccountId"], "abc");
        assert_eq!(json["projectTemplateKey"], "tmpl");
        assert_eq!(json["assigneeType"], "PROJECT_LEAD");
    }

    #[test]
    fn test_create_meta_flattening() {
        let json = serde_json::json!({
            "projects": [{
                "key": "ITDVPS",
                "issuetypes": [{
                    "name": "Epic",
                    "fields": {
                        "customfield_10257": {
                            "name": "Quarter",
                            "required": true,
                            "allowedValues": [
                                { "id": "10301", "value": "Q1" },
                                { "id": "10302", "value": "Q2" }
                            ]
                        },
                        "issuetype": {
                            "name": "Issue Type",
                            "required": true,
                            "allowedValues": [{ "id": 10000, "name": "Epic" }]
                        },
                        "summary": { "name": "Summary", "required": true }
                    }
                }]
            }]
        });
        let resp: JiraCreateMetaResponse = serde_json::from_value(json).unwrap();
        let meta = resp.into_domain("ITDVPS", "Epic");

        let quarter = meta.field("customfield_10257").unwrap();
        assert!(quarter.required);
        assert_eq!(quarter.allowed_values.len(), 2);
        assert_eq!(quarter.allowed_values[1].value, "Q2");

        let issuetype = meta.field("issuetype").unwrap();
        assert_eq!(issuetype.allowed_values[0].id, "10000");
        assert_eq!(issuetype.allowed_values[0].value, "Epic");

        assert!(meta.field("summary").unwrap().allowed_values.is_empty());
        assert!(meta.field("customfield_99999").is_none());
    }
}
