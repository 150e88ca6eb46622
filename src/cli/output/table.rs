//! Table output formatting for CLI commands
//!
//! Renders execution summaries with comfy-table. Colors follow `NO_COLOR`
//! and are dropped on dumb terminals.

use std::env;

use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};

use crate::services::ExecutionSummary;

/// Table formatter for CLI output
pub struct TableFormatter {
    use_colors: bool,
    max_width: Option<u16>,
}

impl TableFormatter {
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
            max_width: None,
        }
    }

    pub const fn with_config(use_colors: bool, max_width: Option<u16>) -> Self {
        Self {
            use_colors,
            max_width,
        }
    }

    /// One row per entry, grouped by section. Empty sections are omitted.
    pub fn format_summary(&self, summary: &ExecutionSummary) -> String {
        let mut table = self.create_base_table();
        table.set_header(vec![
            Cell::new("Section").add_attribute(Attribute::Bold),
            Cell::new("Entry").add_attribute(Attribute::Bold),
        ]);

        for (title, entries) in summary.sections() {
            let failure = title.starts_with("Failed");
            for entry in entries {
                let section = if self.use_colors {
                    Cell::new(title).fg(section_color(title, failure))
                } else {
                    Cell::new(title)
                };
                table.add_row(vec![section, Cell::new(entry)]);
            }
        }

        table.to_string()
    }

    fn create_base_table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        if let Some(width) = self.max_width {
            table.set_width(width);
        }

        table
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn section_color(title: &str, failure: bool) -> Color {
    if failure {
        Color::Red
    } else if title.starts_with("Skipped") {
        Color::Yellow
    } else {
        Color::Green
    }
}

fn supports_color() -> bool {
    if env::var("NO_COLOR").is_ok() {
        return false;
    }

    if let Ok(term) = env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    true
}
