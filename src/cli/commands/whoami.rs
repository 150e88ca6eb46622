//! `issuebridge whoami`

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::commands::connect;
use crate::cli::output::{create_spinner, output, CommandOutput, ProgressBarExt};
use crate::domain::models::Config;

#[derive(Debug, Serialize)]
pub struct WhoamiOutput {
    pub url: String,
    pub display_name: String,
    pub email_address: String,
    pub account_id: String,
}

impl CommandOutput for WhoamiOutput {
    fn to_human(&self) -> String {
        format!(
            "Authenticated to {}\n  Name:       {}\n  Email:      {}\n  Account id: {}",
            self.url, self.display_name, self.email_address, self.account_id
        )
    }
}

pub async fn execute(config: &Config, json: bool) -> Result<()> {
    let client = connect(config)?;
    let spinner = create_spinner("Authenticating", json);
    let me = match client.myself().await {
        Ok(me) => {
            spinner.finish_success("Authenticated");
            me
        }
        Err(e) => {
            spinner.finish_error("Authentication failed");
            return Err(e).context("Authentication failed");
        }
    };

    output(
        &WhoamiOutput {
            url: client.base_url().to_string(),
            display_name: me.display_name,
            email_address: me.email_address,
            account_id: me.account_id.to_string(),
        },
        json,
    );
    Ok(())
}
