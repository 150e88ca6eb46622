//! Fuzzy user resolution.
//!
//! Maps a free-text identifier (display name, username fragment or email) to
//! a directory account id. Two strategies run in order:
//!
//! 1. **Email pattern**: when the query has no `@`, synthesize organizational
//!    addresses from it and look each one up; the first hit wins.
//! 2. **Fuzzy search**: search the directory with the raw query, score every
//!    candidate's username, display name and email against it, and keep the
//!    best candidate scoring above the threshold.
//!
//! Directory failures never escape: they are logged and the affected
//! strategy is treated as having found nothing.

use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use crate::domain::models::{AccountId, DirectoryEntry, Resolution, ResolutionPath, ResolverConfig};
use crate::domain::ports::UserDirectory;
use crate::services::similarity::ratio;

/// Resolves free-text user references against a [`UserDirectory`].
///
/// Stateless between calls: every resolution queries the directory afresh.
pub struct UserResolver {
    directory: Arc<dyn UserDirectory>,
    config: ResolverConfig,
}

impl UserResolver {
    pub fn new(directory: Arc<dyn UserDirectory>, config: ResolverConfig) -> Self {
        Self { directory, config }
    }

    pub const fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Account id for `query`, or `None` when no entry is a confident match.
    pub async fn resolve(&self, query: &str) -> Option<AccountId> {
        self.resolve_detailed(query).await.map(|r| r.account_id)
    }

    /// Like [`resolve`](Self::resolve), also reporting score and strategy.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn resolve_detailed(&self, query: &str) -> Option<Resolution> {
        if query.trim().is_empty() {
            debug!("Empty user query, nothing to resolve");
            return None;
        }
        debug!("Attempting to find user");

        if !query.contains('@') {
            if let Some(found) = self.resolve_by_email_pattern(query).await {
                return Some(found);
            }
        }

        let found = self.resolve_by_search(query).await;
        if found.is_none() {
            warn!("No user found matching '{query}'");
        }
        found
    }

    /// Organizational addresses synthesized from a name-like query, in lookup order.
    pub fn email_candidates(&self, query: &str) -> Vec<String> {
        let domain = &self.config.domain_suffix;
        [
            query.to_string(),
            query.to_lowercase(),
            query.replace(' ', ""),
            query.replace(' ', ".").to_lowercase(),
        ]
        .into_iter()
        .map(|local| format!("{local}@{domain}"))
        .collect()
    }

    async fn resolve_by_email_pattern(&self, query: &str) -> Option<Resolution> {
        for candidate in self.email_candidates(query) {
            debug!(email = %candidate, "Trying email pattern");
            match self.directory.search_users(&candidate, 1).await {
                Ok(entries) => {
                    if let Some(entry) = entries.into_iter().next() {
                        info!(
                            display_name = %entry.display_name,
                            email = %entry.email_address,
                            "Found user with email pattern"
                        );
                        return Some(Resolution {
                            account_id: entry.account_id,
                            score: 1.0,
                            path: ResolutionPath::EmailPattern,
                            display_name: entry.display_name,
                        });
                    }
                }
                Err(e) => {
                    debug!(error = %e, "Email pattern search failed");
                    return None;
                }
            }
        }
        None
    }

    async fn resolve_by_search(&self, query: &str) -> Option<Resolution> {
        debug!("Attempting direct user search");
        let entries = match self
            .directory
            .search_users(query, self.config.max_candidates)
            .await
        {
            Ok(entries) => entries,
            Err(e) => {
                error!(error = %e, "Error in direct user search");
                return None;
            }
        };
        debug!(candidates = entries.len(), "Found potential matches");

        let (entry, score) = best_match(query, entries, self.config.similarity_threshold)?;
        info!(
            display_name = %entry.display_name,
            username = %entry.username,
            email = %entry.email_address,
            similarity = score,
            "Found best matching user"
        );
        Some(Resolution {
            account_id: entry.account_id,
            score,
            path: ResolutionPath::Fuzzy,
            display_name: entry.display_name,
        })
    }
}

/// Highest of the entry's per-field similarities to `query`.
pub fn entry_score(query: &str, entry: &DirectoryEntry) -> f64 {
    entry
        .match_fields()
        .iter()
        .map(|field| ratio(query, field))
        .fold(0.0, f64::max)
}

/// Best-scoring entry strictly above `threshold`.
///
/// Ties keep the earliest entry in `entries` order.
pub fn best_match(
    query: &str,
    entries: Vec<DirectoryEntry>,
    threshold: f64,
) -> Option<(DirectoryEntry, f64)> {
    let mut best: Option<(DirectoryEntry, f64)> = None;
    for entry in entries {
        let score = entry_score(query, &entry);
        if score <= threshold {
            continue;
        }
        if best.as_ref().is_none_or(|(_, best_score)| score > *best_score) {
            best = Some((entry, score));
        }
    }
    best
}
