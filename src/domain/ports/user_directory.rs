//! User directory port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::DirectoryEntry;

/// Read-only lookup of accounts in the tracker's user directory.
///
/// Server-side matching is substring/fuzzy and result order is not
/// guaranteed to reflect relevance; callers re-rank as needed.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Search accounts by free text, returning at most `max_results` entries.
    async fn search_users(&self, query: &str, max_results: usize)
        -> DomainResult<Vec<DirectoryEntry>>;
}
