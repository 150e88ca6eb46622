//! Jira HTTP client with rate limiting.
//!
//! Wraps the Jira Cloud REST API (v2 for issues and users, v3 for project
//! creation), providing typed methods for the operations behind the
//! [`UserDirectory`] and [`IssueTracker`] ports. Authenticates with Basic
//! auth (account email + API token) and throttles itself with a token-bucket
//! rate limiter.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    Config, CreateMeta, CreatedIssue, DirectoryEntry, IssueFields, IssueSnapshot, NewProject,
    ProjectInfo,
};
use crate::domain::ports::{IssueTracker, UserDirectory};
use crate::infrastructure::logging::SecretScrubber;

use super::models::{
    JiraCreateIssueResponse, JiraCreateMetaResponse, JiraCreateProjectRequest, JiraIssueRequest,
    JiraProject, JiraSearchRequest, JiraSearchResponse, JiraUser,
};

/// Token-bucket rate limiter.
///
/// Allows up to `capacity` requests per `window`. When the bucket is
/// exhausted, [`acquire`](RateLimiter::acquire) sleeps until the window
/// resets.
#[derive(Debug)]
pub struct RateLimiter {
    capacity: u32,
    tokens: u32,
    window: Duration,
    window_start: Instant,
}

impl RateLimiter {
    pub fn new(capacity: u32, window: Duration) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            tokens: capacity,
            window,
            window_start: Instant::now(),
        }
    }

    /// `capacity` requests per minute.
    pub fn per_minute(capacity: u32) -> Self {
        Self::new(capacity, Duration::from_secs(60))
    }

    /// Acquire a single token, sleeping if necessary.
    pub async fn acquire(&mut self) {
        let elapsed = self.window_start.elapsed();
        if elapsed >= self.window {
            self.tokens = self.capacity;
            self.window_start = Instant::now();
        }

        if self.tokens > 0 {
            self.tokens -= 1;
        } else {
            let remaining = self.window.saturating_sub(elapsed);
            tracing::warn!(
                sleep_ms = u64::try_from(remaining.as_millis()).unwrap_or(u64::MAX),
                "Jira request budget exhausted, sleeping"
            );
            tokio::time::sleep(remaining).await;
            self.tokens = self.capacity - 1;
            self.window_start = Instant::now();
        }
    }

    pub const fn available(&self) -> u32 {
        self.tokens
    }
}

/// Connection settings for [`JiraClient`].
#[derive(Debug, Clone)]
pub struct JiraClientConfig {
    /// Instance root, e.g. `https://example.atlassian.net`. No trailing slash needed.
    pub base_url: String,
    pub email: String,
    pub api_token: String,
    pub timeout: Duration,
    pub requests_per_minute: u32,
}

/// HTTP client for the Jira REST API.
///
/// Transport failures map to [`DomainError::RequestFailed`], 401/403 to
/// [`DomainError::Unauthorized`], 404 to [`DomainError::NotFound`] and any
/// other non-success status to [`DomainError::UnexpectedStatus`]. Error
/// bodies are scrubbed of credentials before they are returned.
#[derive(Clone)]
pub struct JiraClient {
    http: Client,
    base_url: String,
    email: String,
    api_token: String,
    rate_limiter: Arc<Mutex<RateLimiter>>,
    scrubber: SecretScrubber,
}

impl JiraClient {
    pub fn new(config: JiraClientConfig) -> DomainResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("issuebridge/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DomainError::RequestFailed(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            email: config.email,
            api_token: config.api_token,
            rate_limiter: Arc::new(Mutex::new(RateLimiter::per_minute(
                config.requests_per_minute,
            ))),
            scrubber: SecretScrubber::new(),
        })
    }

    /// Create a client from loaded configuration.
    ///
    /// Fails with [`DomainError::ValidationFailed`] naming every missing
    /// credential setting.
    pub fn from_config(config: &Config) -> DomainResult<Self> {
        let (url, email, token) = config.require_credentials().map_err(|missing| {
            DomainError::ValidationFailed(format!(
                "missing Jira credentials: {}",
                missing.join(", ")
            ))
        })?;

        Self::new(JiraClientConfig {
            base_url: url.to_string(),
            email: email.to_string(),
            api_token: token.to_string(),
            timeout: Duration::from_secs(config.jira.timeout_secs),
            requests_per_minute: config.jira.requests_per_minute,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Acquire a rate-limit token and build an authorized request.
    async fn rate_limited_request(&self, method: Method, path: &str) -> RequestBuilder {
        self.rate_limiter.lock().await.acquire().await;
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .basic_auth(&self.email, Some(&self.api_token))
            .header("Accept", "application/json")
    }

    /// Send a request and return the response if its status is one of `expected`.
    async fn send(
        &self,
        op: &str,
        req: RequestBuilder,
        expected: &[StatusCode],
    ) -> DomainResult<Response> {
        let resp = req
            .send()
            .await
            .map_err(|e| DomainError::RequestFailed(format!("Jira {op} request failed: {e}")))?;

        let status = resp.status();
        if expected.contains(&status) || (expected.is_empty() && status.is_success()) {
            return Ok(resp);
        }

        let body = self
            .scrubber
            .scrub_message(&resp.text().await.unwrap_or_default());
        tracing::debug!(op, status = status.as_u16(), body = %body, "Jira request rejected");

        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                DomainError::Unauthorized(format!("Jira {op} returned {status}: {body}"))
            }
            StatusCode::NOT_FOUND => {
                DomainError::NotFound(format!("Jira {op} returned {status}: {body}"))
            }
            _ => DomainError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            },
        })
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        op: &str,
        req: RequestBuilder,
        expected: &[StatusCode],
    ) -> DomainResult<T> {
        self.send(op, req, expected)
            .await?
            .json::<T>()
            .await
            .map_err(|e| DomainError::SerializationError(format!("Jira {op} parse failed: {e}")))
    }

    /// `GET /rest/api/2/user/search`. Accounts without an id are dropped.
    pub async fn search_users(
        &self,
        query: &str,
        max_results: usize,
    ) -> DomainResult<Vec<DirectoryEntry>> {
        let max = max_results.to_string();
        let req = self
            .rate_limited_request(Method::GET, "/rest/api/2/user/search")
            .await
            .query(&[("query", query), ("maxResults", max.as_str())]);

        let users: Vec<JiraUser> = self.send_json("user_search", req, &[]).await?;
        Ok(users.into_iter().filter_map(JiraUser::into_entry).collect())
    }

    /// `GET /rest/api/2/myself`.
    pub async fn myself(&self) -> DomainResult<DirectoryEntry> {
        let req = self
            .rate_limited_request(Method::GET, "/rest/api/2/myself")
            .await;
        let user: JiraUser = self.send_json("myself", req, &[]).await?;
        user.into_entry().ok_or_else(|| {
            DomainError::SerializationError("Jira myself response has no accountId".to_string())
        })
    }

    /// `GET /rest/api/2/project/{key}`.
    pub async fn project(&self, key: &str) -> DomainResult<ProjectInfo> {
        let req = self
            .rate_limited_request(Method::GET, &format!("/rest/api/2/project/{key}"))
            .await;
        let project: JiraProject = self.send_json("get_project", req, &[]).await?;
        Ok(project.into())
    }

    /// `POST /rest/api/3/project`; Jira answers 201 Created.
    pub async fn create_project(&self, project: &NewProject) -> DomainResult<ProjectInfo> {
        let body = JiraCreateProjectRequest {
            key: project.key.clone(),
            name: project.name.clone(),
            project_type_key: project.project_type_key.clone(),
            project_template_key: project.template_key.clone(),
            description: project.description.clone(),
            lead_account_id: project.lead_account_id.as_str().to_string(),
            assignee_type: "PROJECT_LEAD".to_string(),
        };
        let req = self
            .rate_limited_request(Method::POST, "/rest/api/3/project")
            .await
            .json(&body);

        let created: JiraProject = self
            .send_json("create_project", req, &[StatusCode::CREATED])
            .await?;
        Ok(ProjectInfo {
            id: created.id,
            key: created.key,
            name: project.name.clone(),
        })
    }

    /// `GET /rest/api/2/issue/createmeta` with field expansion.
    pub async fn create_meta(&self, project_key: &str, issue_type: &str) -> DomainResult<CreateMeta> {
        let req = self
            .rate_limited_request(Method::GET, "/rest/api/2/issue/createmeta")
            .await
            .query(&[
                ("projectKeys", project_key),
                ("issuetypeNames", issue_type),
                ("expand", "projects.issuetypes.fields"),
            ]);
        let meta: JiraCreateMetaResponse = self.send_json("create_meta", req, &[]).await?;
        Ok(meta.into_domain(project_key, issue_type))
    }

    /// `POST /rest/api/2/issue`.
    pub async fn create_issue(&self, fields: &IssueFields) -> DomainResult<CreatedIssue> {
        fields.validate_for_create()?;
        let req = self
            .rate_limited_request(Method::POST, "/rest/api/2/issue")
            .await
            .json(&JiraIssueRequest { fields });
        let created: JiraCreateIssueResponse = self.send_json("create_issue", req, &[]).await?;
        Ok(CreatedIssue {
            id: created.id,
            key: created.key,
        })
    }

    /// `PUT /rest/api/2/issue/{key}`; Jira answers 204 No Content.
    pub async fn update_issue(&self, key: &str, fields: &IssueFields) -> DomainResult<()> {
        fields.validate()?;
        let req = self
            .rate_limited_request(Method::PUT, &format!("/rest/api/2/issue/{key}"))
            .await
            .json(&JiraIssueRequest { fields });
        self.send("update_issue", req, &[]).await?;
        Ok(())
    }

    /// `POST /rest/api/2/search`.
    pub async fn search_issues(
        &self,
        jql: &str,
        max_results: usize,
        fields: &[&str],
    ) -> DomainResult<Vec<IssueSnapshot>> {
        let body = JiraSearchRequest {
            jql: jql.to_string(),
            max_results,
            fields: fields.iter().map(|f| (*f).to_string()).collect(),
        };
        let req = self
            .rate_limited_request(Method::POST, "/rest/api/2/search")
            .await
            .json(&body);
        let found: JiraSearchResponse = self.send_json("search", req, &[]).await?;
        Ok(found.issues.into_iter().map(IssueSnapshot::from).collect())
    }
}

impl std::fmt::Debug for JiraClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiraClient")
            .field("base_url", &self.base_url)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl UserDirectory for JiraClient {
    async fn search_users(
        &self,
        query: &str,
        max_results: usize,
    ) -> DomainResult<Vec<DirectoryEntry>> {
        Self::search_users(self, query, max_results).await
    }
}

#[async_trait]
impl IssueTracker for JiraClient {
    async fn myself(&self) -> DomainResult<DirectoryEntry> {
        Self::myself(self).await
    }

    async fn project(&self, key: &str) -> DomainResult<ProjectInfo> {
        Self::project(self, key).await
    }

    async fn create_project(&self, project: &NewProject) -> DomainResult<ProjectInfo> {
        Self::create_project(self, project).await
    }

    async fn create_meta(&self, project_key: &str, issue_type: &str) -> DomainResult<CreateMeta> {
        Self::create_meta(self, project_key, issue_type).await
    }

    async fn create_issue(&self, fields: &IssueFields) -> DomainResult<CreatedIssue> {
        Self::create_issue(self, fields).await
    }

    async fn update_issue(&self, key: &str, fields: &IssueFields) -> DomainResult<()> {
        Self::update_issue(self, key, fields).await
    }

    async fn search_issues(
        &self,
        jql: &str,
        max_results: usize,
        fields: &[&str],
    ) -> DomainResult<Vec<IssueSnapshot>> {
        Self::search_issues(self, jql, max_results, fields).await
    }
}
