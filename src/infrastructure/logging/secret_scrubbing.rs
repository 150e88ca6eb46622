use regex::{Captures, Regex};
use std::fmt;

/// Removes credentials from text before it is logged or surfaced in errors.
///
/// Tracker error bodies and request diagnostics can echo headers or payload
/// fragments; everything that leaves the HTTP client passes through
/// [`scrub_message`](SecretScrubber::scrub_message) first.
#[derive(Clone)]
pub struct SecretScrubber {
    atlassian_token_pattern: Regex,
    auth_header_pattern: Regex,
    token_pattern: Regex,
    password_pattern: Regex,
}

impl SecretScrubber {
    pub fn new() -> Self {
        Self {
            // Atlassian API tokens: ATATT3xFfGF0...
            atlassian_token_pattern: Regex::new(r"ATATT[a-zA-Z0-9_\-=]{20,}")
                .expect("static atlassian token pattern"),
            // Basic and Bearer credentials in Authorization headers
            auth_header_pattern: Regex::new(r"\b(Basic|Bearer)\s+[a-zA-Z0-9\-_\.=+/]+")
                .expect("static auth header pattern"),
            token_pattern: Regex::new(
                r#"["']?(?:api_token|apitoken|api_key|apikey|token|secret)["']?\s*[:=]\s*["']?([a-zA-Z0-9\-_\.]{12,})["']?"#,
            )
            .expect("static token pattern"),
            password_pattern: Regex::new(r#"["']?password["']?\s*[:=]\s*["']?([^"'\s,}]+)["']?"#)
                .expect("static password pattern"),
        }
    }

    pub fn scrub_message(&self, message: &str) -> String {
        let mut scrubbed = self
            .atlassian_token_pattern
            .replace_all(message, "[API_TOKEN_REDACTED]")
            .to_string();
        scrubbed = self
            .auth_header_pattern
            .replace_all(&scrubbed, "$1 [TOKEN_REDACTED]")
            .to_string();
        scrubbed = self
            .token_pattern
            .replace_all(&scrubbed, |caps: &Captures| {
                let full_match = &caps[0];
                match full_match.find([':', '=']) {
                    Some(pos) => format!("{}{}[REDACTED]", &full_match[..pos], &full_match[pos..=pos]),
                    None => "[REDACTED]".to_string(),
                }
            })
            .to_string();
        self.password_pattern
            .replace_all(&scrubbed, "password=[REDACTED]")
            .to_string()
    }
}

impl Default for SecretScrubber {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SecretScrubber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretScrubber").finish()
    }
}
