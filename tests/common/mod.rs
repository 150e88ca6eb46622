//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::time::Duration;

use issuebridge::adapters::jira::{JiraClient, JiraClientConfig};

pub const EMAIL: &str = "bot@example.com";
pub const TOKEN: &str = "secret-token";
/// `Basic base64("bot@example.com:secret-token")`
pub const AUTH_HEADER: &str = "Basic Ym90QGV4YW1wbGUuY29tOnNlY3JldC10b2tlbg==";

/// Client pointed at a mock server, with a rate limit high enough to never wait.
pub fn client_for(url: &str) -> JiraClient {
    client_with_timeout(url, Duration::from_secs(5))
}

pub fn client_with_timeout(url: &str, timeout: Duration) -> JiraClient {
    JiraClient::new(JiraClientConfig {
        base_url: url.to_string(),
        email: EMAIL.to_string(),
        api_token: TOKEN.to_string(),
        timeout,
        requests_per_minute: 10_000,
    })
    .expect("Failed to create client")
}
