//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines async trait interfaces that tracker adapters must implement:
//! - UserDirectory: account lookups used by user resolution
//! - IssueTracker: project, metadata and issue operations
//!
//! These traits keep the resolver and importers independent of the HTTP
//! client, so tests drive them with in-memory fakes.

pub mod issue_tracker;
pub mod user_directory;

pub use issue_tracker::IssueTracker;
pub use user_directory::UserDirectory;
