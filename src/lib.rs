//! issuebridge - spreadsheet-to-Jira importer
//!
//! Turns quarterly planning sheets, site sizing sheets and YAML project plans
//! into Jira issues. People named in the sheets are resolved to Jira account
//! ids by synthesized-email lookup with a fuzzy directory-search fallback.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): models, errors and the tracker port traits
//! - **Service Layer** (`services`): user resolution and the importers
//! - **Adapters** (`adapters`): the Jira REST client implementing the ports
//! - **Infrastructure Layer** (`infrastructure`): config, logging, sheet readers
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use issuebridge::{ConfigLoader, JiraClient, UserResolver};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::load()?;
//!     let client = Arc::new(JiraClient::from_config(&config)?);
//!     let resolver = UserResolver::new(client, config.resolver.clone());
//!     println!("{:?}", resolver.resolve("Jane Doe").await);
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use adapters::jira::{JiraClient, JiraClientConfig};
pub use domain::models::{AccountId, Config, DirectoryEntry, Resolution, ResolverConfig};
pub use domain::ports::{IssueTracker, UserDirectory};
pub use domain::{DomainError, DomainResult};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{ExecutionSummary, RowImporter, UserResolver};
