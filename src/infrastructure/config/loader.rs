use std::path::Path;

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use reqwest::Url;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid similarity_threshold: {0}. Must be between 0.0 and 1.0")]
    InvalidThreshold(f64),

    #[error("Invalid max_candidates: {0}. Must be at least 1")]
    InvalidMaxCandidates(usize),

    #[error("Resolver domain_suffix cannot be empty")]
    EmptyDomainSuffix,

    #[error("Invalid timeout_secs: {0}. Must be at least 1")]
    InvalidTimeout(u64),

    #[error("Invalid requests_per_minute: {0}. Must be at least 1")]
    InvalidRateLimit(u32),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid Jira URL '{0}': {1}")]
    InvalidUrl(String, String),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .issuebridge/config.yaml (project config)
    /// 3. .issuebridge/local.yaml (local overrides, optional)
    /// 4. Environment variables (ISSUEBRIDGE_* prefix, `__` for nesting)
    /// 5. JIRA_URL, JIRA_EMAIL and JIRA_API_TOKEN
    pub fn load() -> Result<Config> {
        Self::load_from(None)
    }

    /// Load configuration from a specific file instead of the project files.
    ///
    /// Environment overrides still apply.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        Self::load_from(Some(path.as_ref()))
    }

    fn load_from(path: Option<&Path>) -> Result<Config> {
        let config: Config = Self::figment(path).extract().context(match path {
            Some(p) => format!("Failed to load config from {}", p.display()),
            None => "Failed to extract configuration from figment".to_string(),
        })?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// The merged provider stack, before extraction.
    pub fn figment(path: Option<&Path>) -> Figment {
        let figment = Figment::new().merge(Serialized::defaults(Config::default()));
        let figment = match path {
            Some(p) => figment.merge(Yaml::file(p)),
            None => figment
                .merge(Yaml::file(".issuebridge/config.yaml"))
                .merge(Yaml::file(".issuebridge/local.yaml")),
        };

        figment
            .merge(Env::prefixed("ISSUEBRIDGE_").split("__"))
            .merge(
                Env::prefixed("JIRA_")
                    .only(&["url", "email", "api_token"])
                    .map(|key| format!("jira.{key}").into()),
            )
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let resolver = &config.resolver;
        if !(0.0..=1.0).contains(&resolver.similarity_threshold) {
            return Err(ConfigError::InvalidThreshold(resolver.similarity_threshold));
        }
        if resolver.max_candidates == 0 {
            return Err(ConfigError::InvalidMaxCandidates(resolver.max_candidates));
        }
        if resolver.domain_suffix.trim().is_empty() {
            return Err(ConfigError::EmptyDomainSuffix);
        }

        if config.jira.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout(config.jira.timeout_secs));
        }
        if config.jira.requests_per_minute == 0 {
            return Err(ConfigError::InvalidRateLimit(config.jira.requests_per_minute));
        }
        if let Some(url) = config.jira.url.as_deref().filter(|u| !u.trim().is_empty()) {
            let parsed =
                Url::parse(url).map_err(|e| ConfigError::InvalidUrl(url.to_string(), e.to_string()))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ConfigError::InvalidUrl(
                    url.to_string(),
                    "scheme must be http or https".to_string(),
                ));
            }
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let import = &config.import;
        for (name, value) in [
            ("default_project", &import.default_project),
            ("qbv_project", &import.qbv_project),
            ("ongoing_parent", &import.ongoing_parent),
            ("quarter_dod_column", &import.quarter_dod_column),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::ValidationFailed(format!(
                    "import.{name} cannot be empty"
                )));
            }
        }
        if import.label.trim().is_empty() || import.label.contains(' ') {
            return Err(ConfigError::ValidationFailed(format!(
                "import.label '{}' must be non-empty and contain no spaces",
                import.label
            )));
        }
        for (name, id) in import.fields.all() {
            if !crate::domain::models::is_custom_field_id(id) {
                return Err(ConfigError::ValidationFailed(format!(
                    "import.fields.{name} '{id}' is not a custom field id"
                )));
            }
        }

        Ok(())
    }
}
