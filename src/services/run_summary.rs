//! Outcome bookkeeping for batch imports.

use serde::{Deserialize, Serialize};

/// What a batch run did, line by line.
///
/// Entries are human-readable; failures carry the spreadsheet row so the
/// operator can fix the sheet and re-run. Re-runs are safe because existing
/// issues are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionSummary {
    pub created: Vec<String>,
    pub skipped: Vec<String>,
    pub failed_tasks: Vec<String>,
    pub failed_users: Vec<String>,
    pub failed_fields: Vec<String>,
}

impl ExecutionSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// `"{label}: {name} ({key})"`
    pub fn record_created(&mut self, label: &str, name: &str, key: &str) {
        self.created.push(format!("{label}: {name} ({key})"));
    }

    pub fn record_skipped(&mut self, entry: impl Into<String>) {
        self.skipped.push(entry.into());
    }

    /// `"Row {row}: {name} - {reason}"`
    pub fn fail_task(&mut self, row: usize, name: &str, reason: impl std::fmt::Display) {
        self.failed_tasks.push(format!("Row {row}: {name} - {reason}"));
    }

    pub fn fail_user(&mut self, row: usize, name: &str, reason: impl std::fmt::Display) {
        self.failed_users.push(format!("Row {row}: {name} - {reason}"));
    }

    pub fn fail_field(&mut self, row: usize, name: &str, reason: impl std::fmt::Display) {
        self.failed_fields.push(format!("Row {row}: {name} - {reason}"));
    }

    pub fn has_failures(&self) -> bool {
        !(self.failed_tasks.is_empty() && self.failed_users.is_empty() && self.failed_fields.is_empty())
    }

    /// Titled, non-empty sections in display order.
    pub fn sections(&self) -> Vec<(&'static str, &[String])> {
        [
            ("Created/Updated Issues", self.created.as_slice()),
            ("Skipped Issues (already exist)", self.skipped.as_slice()),
            ("Failed Tasks", self.failed_tasks.as_slice()),
            ("Failed User Assignments", self.failed_users.as_slice()),
            ("Failed Field Updates", self.failed_fields.as_slice()),
        ]
        .into_iter()
        .filter(|(_, entries)| !entries.is_empty())
        .collect()
    }

    /// Emit the summary through tracing, failures at warn level.
    pub fn log(&self) {
        tracing::info!("=== Execution Summary ===");
        for (title, entries) in self.sections() {
            let failure = title.starts_with("Failed");
            for entry in entries {
                if failure {
                    tracing::warn!(section = title, "- {entry}");
                } else {
                    tracing::info!(section = title, "- {entry}");
                }
            }
        }
        if !self.has_failures() {
            tracing::info!("All tasks completed successfully!");
        }
    }
}
