//! User directory models.
//!
//! A [`DirectoryEntry`] is a read-only snapshot of one account in the issue
//! tracker's user directory. Entries are fetched per lookup and never
//! mutated or cached by this crate.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque, stable identifier of a directory account.
///
/// Used wherever the tracker expects a user reference (assignee, lead,
/// mentions).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Wiki-markup mention for this account, e.g. `@[~5b10ac8d82e05b22cc7d4ef5]`.
    pub fn mention(&self) -> String {
        format!("@[~{}]", self.0)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// One account as returned by the directory service.
///
/// Text attributes missing from the service payload are stored as empty
/// strings so they score 0 during fuzzy matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub username: String,
    pub display_name: String,
    pub email_address: String,
    pub account_id: AccountId,
}

impl DirectoryEntry {
    pub fn new(
        username: impl Into<String>,
        display_name: impl Into<String>,
        email_address: impl Into<String>,
        account_id: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            display_name: display_name.into(),
            email_address: email_address.into(),
            account_id: AccountId::new(account_id),
        }
    }

    /// The fields compared against a resolution query, in scoring order.
    pub fn match_fields(&self) -> [&str; 3] {
        [&self.username, &self.display_name, &self.email_address]
    }
}

/// Which resolution strategy produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionPath {
    /// Exact lookup of a synthesized organizational email address.
    EmailPattern,
    /// Free-text directory search re-ranked by similarity.
    Fuzzy,
}

impl fmt::Display for ResolutionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmailPattern => f.write_str("email-pattern"),
            Self::Fuzzy => f.write_str("fuzzy"),
        }
    }
}

/// A successful user resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub account_id: AccountId,
    /// Similarity of the matched entry; `1.0` for email-pattern hits.
    pub score: f64,
    pub path: ResolutionPath,
    pub display_name: String,
}
