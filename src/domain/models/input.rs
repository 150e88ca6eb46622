//! Input records read from planning sheets and project plans.

use serde::{Deserialize, Serialize};

/// One row of the quarterly planning sheet.
///
/// `row_number` is the spreadsheet line the row came from (header is line 1).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanRow {
    pub row_number: usize,
    pub project_name: String,
    pub final_dod: Option<String>,
    pub quarter_dod: Option<String>,
    pub project_manager: Option<String>,
    pub issue_type: Option<String>,
    pub description: Option<String>,
    pub lead: Option<String>,
    pub parent: Option<String>,
}

/// One row of the site sizing sheet, turned into a deployment sub-task.
///
/// Short rows are padded with blank cells; `missing_columns` reports them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteRow {
    pub row_number: usize,
    pub site_name: String,
    pub cpu: String,
    pub mem: String,
    pub storage: String,
}

impl SiteRow {
    /// Columns whose cell is blank, in sheet order.
    pub fn missing_columns(&self) -> Vec<&'static str> {
        [
            ("SITE_NAME", &self.site_name),
            ("CPU", &self.cpu),
            ("MEM", &self.mem),
            ("STORAGE", &self.storage),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    pub fn summary(&self) -> String {
        format!(
            "Deployment for {} (CPU: {}, MEM: {}, STORAGE: {}GB)",
            self.site_name, self.cpu, self.mem, self.storage
        )
    }
}

/// A project bootstrap plan: the project itself plus its epics and stories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectPlan {
    pub project: PlannedProject,
    #[serde(default)]
    pub epics: Vec<PlannedEpic>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedProject {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_project_type_key")]
    pub project_type_key: String,
    #[serde(default = "default_template_key")]
    pub template_key: String,
}

fn default_project_type_key() -> String {
    "software".to_string()
}

fn default_template_key() -> String {
    "com.pyxis.greenhopper.jira:gh-simplified-agility-scrum".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedEpic {
    pub summary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub stories: Vec<PlannedStory>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedStory {
    pub summary: String,
    #[serde(default)]
    pub description: String,
}
