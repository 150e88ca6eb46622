use serde::{Deserialize, Serialize};

/// Main configuration structure for issuebridge
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Tracker connection settings
    #[serde(default)]
    pub jira: JiraConfig,

    /// User resolution settings
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Planning-sheet import settings
    #[serde(default)]
    pub import: ImportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Return `(url, email, api_token)` or the names of every missing setting.
    pub fn require_credentials(&self) -> Result<(&str, &str, &str), Vec<&'static str>> {
        fn present(v: &Option<String>) -> Option<&str> {
            v.as_deref().filter(|s| !s.trim().is_empty())
        }

        let url = present(&self.jira.url);
        let email = present(&self.jira.email);
        let token = present(&self.jira.api_token);

        match (url, email, token) {
            (Some(u), Some(e), Some(t)) => Ok((u, e, t)),
            _ => {
                let mut missing = Vec::new();
                if url.is_none() {
                    missing.push("JIRA_URL");
                }
                if email.is_none() {
                    missing.push("JIRA_EMAIL");
                }
                if token.is_none() {
                    missing.push("JIRA_API_TOKEN");
                }
                Err(missing)
            }
        }
    }
}

/// Jira connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct JiraConfig {
    /// Base URL, e.g. `https://example.atlassian.net`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Account email used for Basic auth
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// API token used for Basic auth
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Client-side request budget per minute
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,
}

const fn default_timeout_secs() -> u64 {
    30
}

const fn default_requests_per_minute() -> u32 {
    300
}

impl Default for JiraConfig {
    fn default() -> Self {
        Self {
            url: None,
            email: None,
            api_token: None,
            timeout_secs: default_timeout_secs(),
            requests_per_minute: default_requests_per_minute(),
        }
    }
}

/// User resolution configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ResolverConfig {
    /// Organizational email domain appended to synthesized addresses
    #[serde(default = "default_domain_suffix")]
    pub domain_suffix: String,

    /// Candidates must score strictly above this to match (0.0-1.0)
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    /// Maximum entries fetched by the free-text search
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,
}

fn default_domain_suffix() -> String {
    "example.com".to_string()
}

const fn default_similarity_threshold() -> f64 {
    0.6
}

const fn default_max_candidates() -> usize {
    50
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            domain_suffix: default_domain_suffix(),
            similarity_threshold: default_similarity_threshold(),
            max_candidates: default_max_candidates(),
        }
    }
}

/// Planning-sheet import configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ImportConfig {
    /// Project receiving epics, stories and project updates
    #[serde(default = "default_project")]
    pub default_project: String,

    /// Project receiving QBV items
    #[serde(default = "default_qbv_project")]
    pub qbv_project: String,

    /// Issue type id of QBV items
    #[serde(default = "default_qbv_issue_type_id")]
    pub qbv_issue_type_id: String,

    /// Issue type name used when looking up QBV create metadata
    #[serde(default = "default_qbv_issue_type_name")]
    pub qbv_issue_type_name: String,

    /// Parent of on-going stories
    #[serde(default = "default_ongoing_parent")]
    pub ongoing_parent: String,

    /// Destination team option value
    #[serde(default = "default_destination_team")]
    pub destination_team: String,

    /// Requested-by group option value
    #[serde(default = "default_requested_by_group")]
    pub requested_by_group: String,

    /// QBV group option value
    #[serde(default = "default_qbv_group")]
    pub qbv_group: String,

    /// Label attached to every created issue
    #[serde(default = "default_label")]
    pub label: String,

    /// Planning year; the current year when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,

    /// Header of the quarter DoD column
    #[serde(default = "default_quarter_dod_column")]
    pub quarter_dod_column: String,

    /// Custom field ids
    #[serde(default)]
    pub fields: CustomFieldIds,
}

fn default_project() -> String {
    "ITDVPS".to_string()
}

fn default_qbv_project() -> String {
    "CQ".to_string()
}

fn default_qbv_issue_type_id() -> String {
    "10222".to_string()
}

fn default_qbv_issue_type_name() -> String {
    "QBV".to_string()
}

fn default_ongoing_parent() -> String {
    "ITDVPS-976".to_string()
}

fn default_destination_team() -> String {
    "IT_DevOps Team".to_string()
}

fn default_requested_by_group() -> String {
    "Dev".to_string()
}

fn default_qbv_group() -> String {
    "CSI".to_string()
}

fn default_label() -> String {
    "excel2jira".to_string()
}

fn default_quarter_dod_column() -> String {
    "Q2 DoD".to_string()
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            default_project: default_project(),
            qbv_project: default_qbv_project(),
            qbv_issue_type_id: default_qbv_issue_type_id(),
            qbv_issue_type_name: default_qbv_issue_type_name(),
            ongoing_parent: default_ongoing_parent(),
            destination_team: default_destination_team(),
            requested_by_group: default_requested_by_group(),
            qbv_group: default_qbv_group(),
            label: default_label(),
            year: None,
            quarter_dod_column: default_quarter_dod_column(),
            fields: CustomFieldIds::default(),
        }
    }
}

/// Custom field ids of the target tracker instance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct CustomFieldIds {
    pub dod: String,
    pub dod_new: String,
    pub requested_by_group: String,
    pub destination_team: String,
    pub year: String,
    pub quarter: String,
    pub in_quarter_plan: String,
    pub qbv_group: String,
    pub epic_link: String,
}

impl Default for CustomFieldIds {
    fn default() -> Self {
        Self {
            dod: "customfield_10269".to_string(),
            dod_new: "customfield_10115".to_string(),
            requested_by_group: "customfield_10265".to_string(),
            destination_team: "customfield_10114".to_string(),
            year: "customfield_10268".to_string(),
            quarter: "customfield_10257".to_string(),
            in_quarter_plan: "customfield_10239".to_string(),
            qbv_group: "customfield_10256".to_string(),
            epic_link: "customfield_10008".to_string(),
        }
    }
}

impl CustomFieldIds {
    /// Every configured id with its setting name.
    pub fn all(&self) -> [(&'static str, &str); 9] {
        [
            ("dod", &self.dod),
            ("dod_new", &self.dod_new),
            ("requested_by_group", &self.requested_by_group),
            ("destination_team", &self.destination_team),
            ("year", &self.year),
            ("quarter", &self.quarter),
            ("in_quarter_plan", &self.in_quarter_plan),
            ("qbv_group", &self.qbv_group),
            ("epic_link", &self.epic_link),
        ]
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling JSON log files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<String>,

    /// Rotation of file logs: daily, hourly, never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}
