//! Jira Cloud adapter.
//!
//! Implements the [`UserDirectory`](crate::domain::ports::UserDirectory) and
//! [`IssueTracker`](crate::domain::ports::IssueTracker) ports on top of the
//! Jira REST API.

pub mod client;
pub mod models;

pub use client::{JiraClient, JiraClientConfig, RateLimiter};
