//! Issue field models.
//!
//! Issue payloads are assembled as typed [`IssueFields`] rather than loose
//! JSON maps: every key is a [`FieldKey`], every value a [`FieldValue`], and
//! the whole set is validated before it reaches the tracker.

use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{json, Value};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::directory::AccountId;

/// A field recognized on an issue payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldKey {
    Project,
    Summary,
    Description,
    IssueType,
    Parent,
    Assignee,
    Labels,
    /// A custom field, by id (`customfield_10114`).
    Custom(String),
}

impl FieldKey {
    pub fn custom(id: impl Into<String>) -> Self {
        Self::Custom(id.into())
    }

    /// Wire name of the field.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Project => "project",
            Self::Summary => "summary",
            Self::Description => "description",
            Self::IssueType => "issuetype",
            Self::Parent => "parent",
            Self::Assignee => "assignee",
            Self::Labels => "labels",
            Self::Custom(id) => id,
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value assigned to an issue field, shaped the way the tracker expects.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Plain string (`"summary": "..."`).
    Text(String),
    /// Reference by key (`{"key": "ITDVPS-976"}`).
    Key(String),
    /// Reference by name (`{"name": "Epic"}`).
    Name(String),
    /// Reference by id (`{"id": "10222"}`).
    Id(String),
    /// Select-list option by its display value (`{"value": "IT_DevOps Team"}`).
    Option(String),
    /// User reference (`{"accountId": "..."}`).
    AccountId(AccountId),
    Labels(Vec<String>),
}

impl FieldValue {
    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(s) => Value::String(s.clone()),
            Self::Key(k) => json!({ "key": k }),
            Self::Name(n) => json!({ "name": n }),
            Self::Id(id) => json!({ "id": id }),
            Self::Option(v) => json!({ "value": v }),
            Self::AccountId(id) => json!({ "accountId": id.as_str() }),
            Self::Labels(labels) => json!(labels),
        }
    }
}

/// An ordered, de-duplicated set of issue fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssueFields {
    entries: Vec<(FieldKey, FieldValue)>,
}

impl IssueFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing any previous value for the same key.
    pub fn set(&mut self, key: FieldKey, value: FieldValue) -> &mut Self {
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.entries.push((key, value));
        }
        self
    }

    /// Builder-style [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, key: FieldKey, value: FieldValue) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &FieldKey) -> Option<&FieldValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains(&self, key: &FieldKey) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldKey, &FieldValue)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keep only the fields accepted by `keep`.
    #[must_use]
    pub fn filtered(&self, mut keep: impl FnMut(&FieldKey, &FieldValue) -> bool) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .filter(|(k, v)| keep(k, v))
                .cloned()
                .collect(),
        }
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.entries
                .iter()
                .map(|(k, v)| (k.as_str().to_string(), v.to_json()))
                .collect(),
        )
    }

    /// Check the field set for a create call.
    ///
    /// Requires project, non-blank summary and issue type.
    pub fn validate_for_create(&self) -> DomainResult<()> {
        for required in [FieldKey::Project, FieldKey::Summary, FieldKey::IssueType] {
            if !self.contains(&required) {
                return Err(DomainError::ValidationFailed(format!(
                    "missing required field '{required}'"
                )));
            }
        }
        self.validate()
    }

    /// Check the shape of every present field.
    pub fn validate(&self) -> DomainResult<()> {
        for (key, value) in &self.entries {
            match (key, value) {
                (FieldKey::Summary, FieldValue::Text(s)) if s.trim().is_empty() => {
                    return Err(DomainError::ValidationFailed(
                        "summary cannot be blank".to_string(),
                    ));
                }
                (FieldKey::Summary, FieldValue::Text(_)) => {}
                (FieldKey::Summary, other) => {
                    return Err(DomainError::ValidationFailed(format!(
                        "summary must be text, got {other:?}"
                    )));
                }
                (FieldKey::Labels, FieldValue::Labels(labels)) => {
                    if let Some(bad) = labels.iter().find(|l| l.trim().is_empty() || l.contains(' ')) {
                        return Err(DomainError::ValidationFailed(format!(
                            "invalid label '{bad}': labels must be non-empty and contain no spaces"
                        )));
                    }
                }
                (FieldKey::Labels, other) => {
                    return Err(DomainError::ValidationFailed(format!(
                        "labels must be a list, got {other:?}"
                    )));
                }
                (FieldKey::Custom(id), _) if !is_custom_field_id(id) => {
                    return Err(DomainError::ValidationFailed(format!(
                        "'{id}' is not a custom field id (expected customfield_<number>)"
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

impl Serialize for IssueFields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k.as_str(), &v.to_json())?;
        }
        map.end()
    }
}

/// Whether `id` looks like `customfield_<digits>`.
pub fn is_custom_field_id(id: &str) -> bool {
    id.strip_prefix("customfield_")
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

/// Make a string safe to use as an issue summary.
///
/// Double quotes break the `summary ~ "..."` duplicate check, so they are
/// swapped for single quotes.
pub fn sanitize_summary(summary: &str) -> String {
    summary.trim().replace('"', "'")
}

/// The kind of work item a planning-sheet row asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueKind {
    /// A new Epic in the default project.
    Epic,
    /// A quarterly business value item in the QBV project.
    Qbv,
    /// An update of an existing issue in the default project.
    Project,
    /// A Story under the standing on-going parent.
    OnGoing,
}

impl IssueKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Epic => "Epic",
            Self::Qbv => "QBV",
            Self::Project => "Project Update",
            Self::OnGoing => "On-going",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Epic => "epic",
            Self::Qbv => "qbv",
            Self::Project => "project",
            Self::OnGoing => "on-going",
        })
    }
}

impl FromStr for IssueKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "epic" => Ok(Self::Epic),
            "qbv" => Ok(Self::Qbv),
            "project" => Ok(Self::Project),
            "on-going" | "ongoing" => Ok(Self::OnGoing),
            other => Err(format!(
                "unknown issue type '{other}' (expected epic, qbv, project or on-going)"
            )),
        }
    }
}

/// Identifiers of a freshly created issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedIssue {
    pub id: String,
    pub key: String,
}

/// An existing issue and its current field values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueSnapshot {
    pub key: String,
    #[serde(default)]
    pub fields: serde_json::Map<String, Value>,
}

impl IssueSnapshot {
    /// Whether `key` already holds data on this issue.
    ///
    /// Null, blank strings, empty arrays and empty objects count as empty.
    pub fn has_value(&self, key: &FieldKey) -> bool {
        match self.fields.get(key.as_str()) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(Value::Array(a)) => !a.is_empty(),
            Some(Value::Object(o)) => !o.is_empty(),
            Some(_) => true,
        }
    }
}
