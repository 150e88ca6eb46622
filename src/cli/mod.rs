//! Command-line interface.

pub mod commands;
pub mod output;
pub mod types;

use serde_json::json;

pub use types::{BootstrapArgs, Cli, Commands, ImportArgs, ResolveArgs, SubtasksArgs};

/// Print a fatal error and exit with status 1.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let chain: Vec<String> = err.chain().map(ToString::to_string).collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({ "error": err.to_string(), "causes": chain }))
                .unwrap_or_default()
        );
    } else {
        eprintln!("{} {err:#}", console::style("Error:").red().bold());
    }
    std::process::exit(1)
}
