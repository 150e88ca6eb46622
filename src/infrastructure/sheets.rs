//! Readers for planning sheets, site sheets and project plans.
//!
//! Planning and site sheets are CSV; spreadsheet workbooks are exported to
//! CSV before import. Project plans are YAML.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{PlanRow, ProjectPlan, SiteRow};

pub const PROJECT_NAME: &str = "Project name";
pub const FINAL_DOD: &str = "Final DoD";
pub const PROJECT_MANAGER: &str = "Project Manager";
pub const ISSUE_TYPE: &str = "Issue type";
pub const DESCRIPTION: &str = "Description";
pub const LEAD: &str = "lead";
pub const PARENT: &str = "parent";

fn open(path: &Path) -> DomainResult<File> {
    File::open(path)
        .map_err(|e| DomainError::InputError(format!("cannot open {}: {e}", path.display())))
}

/// Read the planning sheet at `path`.
pub fn read_plan_rows(path: &Path, quarter_dod_column: &str) -> DomainResult<Vec<PlanRow>> {
    parse_plan_rows(open(path)?, quarter_dod_column)
}

/// Parse planning-sheet CSV.
///
/// Every required column must be present in the header; the error lists all
/// of the missing ones. Blank cells become `None`. Rows whose project name is
/// blank are skipped.
pub fn parse_plan_rows<R: Read>(reader: R, quarter_dod_column: &str) -> DomainResult<Vec<PlanRow>> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();

    let column = |name: &str| headers.iter().position(|h| h.trim() == name);

    let required = [
        PROJECT_NAME,
        FINAL_DOD,
        quarter_dod_column,
        PROJECT_MANAGER,
        ISSUE_TYPE,
        DESCRIPTION,
        LEAD,
    ];
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|name| column(name).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(DomainError::InputError(format!(
            "missing required columns: {}",
            missing.join(", ")
        )));
    }

    let idx = |name: &str| column(name).unwrap_or(usize::MAX);
    let (name_i, final_i, quarter_i, pm_i, type_i, desc_i, lead_i) = (
        idx(PROJECT_NAME),
        idx(FINAL_DOD),
        idx(quarter_dod_column),
        idx(PROJECT_MANAGER),
        idx(ISSUE_TYPE),
        idx(DESCRIPTION),
        idx(LEAD),
    );
    let parent_i = column(PARENT);

    let mut rows = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let Some(project_name) = cell(&record, name_i) else {
            tracing::debug!(row = i + 2, "Skipping row without a project name");
            continue;
        };
        rows.push(PlanRow {
            row_number: i + 2,
            project_name,
            final_dod: cell(&record, final_i),
            quarter_dod: cell(&record, quarter_i),
            project_manager: cell(&record, pm_i),
            issue_type: cell(&record, type_i),
            description: cell(&record, desc_i),
            lead: cell(&record, lead_i),
            parent: parent_i.and_then(|p| cell(&record, p)),
        });
    }

    Ok(rows)
}

fn cell(record: &StringRecord, index: usize) -> Option<String> {
    record
        .get(index)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Read the site sheet at `path`.
pub fn read_site_rows(path: &Path) -> DomainResult<Vec<SiteRow>> {
    parse_site_rows(open(path)?)
}

/// Parse site-sheet CSV: `SITE_NAME, CPU, MEM, STORAGE` by position, first
/// line skipped as a header.
///
/// Short rows are kept with blank cells so the importer can report them per
/// row. Fully blank lines are skipped.
pub fn parse_site_rows<R: Read>(reader: R) -> DomainResult<Vec<SiteRow>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let field = |n: usize| record.get(n).map(str::trim).unwrap_or_default().to_string();
        if record.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        if record.len() < 4 {
            tracing::warn!(row = i + 2, columns = record.len(), "Short site row");
        }
        rows.push(SiteRow {
            row_number: i + 2,
            site_name: field(0),
            cpu: field(1),
            mem: field(2),
            storage: field(3),
        });
    }
    Ok(rows)
}

/// Load a YAML project plan.
pub fn load_plan(path: &Path) -> DomainResult<ProjectPlan> {
    parse_plan(open(path)?)
}

pub fn parse_plan<R: Read>(reader: R) -> DomainResult<ProjectPlan> {
    let plan: ProjectPlan = serde_yaml::from_reader(reader)?;
    if plan.project.key.trim().is_empty() {
        return Err(DomainError::InputError("project key cannot be empty".to_string()));
    }
    if let Some(epic) = plan.epics.iter().find(|e| e.summary.trim().is_empty()) {
        return Err(DomainError::InputError(format!(
            "epic with description '{}' has an empty summary",
            epic.description
        )));
    }
    Ok(plan)
}
