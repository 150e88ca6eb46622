//! `issuebridge resolve`

use anyhow::Result;
use serde::Serialize;

use crate::cli::commands::connect;
use crate::cli::output::{output, CommandOutput};
use crate::cli::types::ResolveArgs;
use crate::domain::models::{Config, Resolution};
use crate::services::UserResolver;

#[derive(Debug, Serialize)]
pub struct ResolveOutput {
    pub query: String,
    pub resolution: Option<Resolution>,
}

impl CommandOutput for ResolveOutput {
    fn to_human(&self) -> String {
        match &self.resolution {
            Some(r) => format!(
                "{} -> {}\n  Display name: {}\n  Score:        {:.2}\n  Matched by:   {}",
                self.query, r.account_id, r.display_name, r.score, r.path
            ),
            None => format!("No match for '{}'", self.query),
        }
    }
}

/// A missing match is reported, not treated as an error.
pub async fn execute(args: ResolveArgs, config: &Config, json: bool) -> Result<()> {
    let client = connect(config)?;
    let resolver = UserResolver::new(client, config.resolver.clone());
    let resolution = resolver.resolve_detailed(&args.query).await;

    output(
        &ResolveOutput {
            query: args.query,
            resolution,
        },
        json,
    );
    Ok(())
}
