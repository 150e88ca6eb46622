//! Planning-sheet row import.
//!
//! Each row of the quarterly planning sheet becomes one tracker action
//! chosen by its issue type: create an Epic, create a QBV item, fill the
//! empty fields of an existing project issue, or create an on-going Story.
//! Creation is skipped when an issue with the same summary already exists,
//! so a sheet can be re-imported after fixing failed rows.
//!
//! Row failures are recorded in the [`ExecutionSummary`] and never stop the
//! run; only the startup checks ([`RowImporter::prepare`]) are fatal.

use std::sync::Arc;

use chrono::{Datelike, Local, NaiveDate};
use tracing::{debug, error, info, instrument, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    sanitize_summary, FieldKey, FieldValue, ImportConfig, IssueFields, IssueKind, PlanRow,
};
use crate::domain::ports::IssueTracker;
use crate::services::field_catalog::FieldCatalog;
use crate::services::run_summary::ExecutionSummary;
use crate::services::user_resolver::UserResolver;

/// Per-run choices, usually from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOptions {
    /// Project receiving epics, stories and project updates.
    pub project: String,
    /// Quarter option value, `Q1` to `Q4`.
    pub quarter: String,
    /// Process only rows of this kind.
    pub only: Option<IssueKind>,
    /// Build and validate field sets without writing anything.
    pub dry_run: bool,
}

impl ImportOptions {
    /// Options for `project` in the quarter after today.
    pub fn for_project(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            quarter: next_quarter(Local::now().date_naive()),
            only: None,
            dry_run: false,
        }
    }
}

/// Option ids resolved once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOptions {
    pub requested_by_group: FieldValue,
    pub year: FieldValue,
    pub quarter: FieldValue,
    pub in_quarter_plan: FieldValue,
    /// Only resolved when QBV rows will be processed.
    pub qbv_group: Option<FieldValue>,
}

/// The quarter after the one containing `today`, as `Q1`..`Q4`.
pub fn next_quarter(today: NaiveDate) -> String {
    let current = (today.month() - 1) / 3 + 1;
    format!("Q{}", current % 4 + 1)
}

/// Whether `quarter` is one of `Q1`..`Q4`.
pub fn is_valid_quarter(quarter: &str) -> bool {
    matches!(quarter, "Q1" | "Q2" | "Q3" | "Q4")
}

/// JQL matching issues in `project` whose summary contains `summary`.
pub fn duplicate_summary_jql(project: &str, summary: &str) -> String {
    format!(
        "project = \"{}\" AND summary ~ \"{}\"",
        escape_jql(project),
        escape_jql(summary)
    )
}

fn escape_jql(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Imports planning-sheet rows into the tracker.
pub struct RowImporter {
    tracker: Arc<dyn IssueTracker>,
    resolver: UserResolver,
    catalog: FieldCatalog,
    config: ImportConfig,
}

/// Values shared by every field set built for one row.
struct RowContent {
    name: String,
    description: String,
    dod: String,
    assignee: Option<FieldValue>,
}

impl RowImporter {
    pub fn new(tracker: Arc<dyn IssueTracker>, resolver: UserResolver, config: ImportConfig) -> Self {
        Self {
            catalog: FieldCatalog::new(tracker.clone()),
            tracker,
            resolver,
            config,
        }
    }

    /// Startup checks: authentication, project access and option ids.
    ///
    /// Any failure here aborts the import.
    #[instrument(skip(self, options), fields(project = %options.project, quarter = %options.quarter))]
    pub async fn prepare(&self, options: &ImportOptions) -> DomainResult<ResolvedOptions> {
        if !is_valid_quarter(&options.quarter) {
            return Err(DomainError::ValidationFailed(format!(
                "invalid quarter '{}' (expected Q1, Q2, Q3 or Q4)",
                options.quarter
            )));
        }

        let me = self.tracker.myself().await?;
        info!(user = %me.display_name, "Successfully authenticated");

        let project = self.tracker.project(&options.project).await?;
        info!(key = %project.key, name = %project.name, "Successfully accessed project");

        let fields = &self.config.fields;
        let project = options.project.as_str();
        let year = self.config.year.unwrap_or_else(|| Local::now().year()).to_string();
        let resolved = ResolvedOptions {
            requested_by_group: self
                .epic_option(project, &fields.requested_by_group, &self.config.requested_by_group)
                .await?,
            year: self.epic_option(project, &fields.year, &year).await?,
            quarter: self.epic_option(project, &fields.quarter, &options.quarter).await?,
            in_quarter_plan: self.epic_option(project, &fields.in_quarter_plan, "Yes").await?,
            qbv_group: if matches!(options.only, None | Some(IssueKind::Qbv)) {
                Some(
                    self.catalog
                        .allowed_value_id(
                            &fields.qbv_group,
                            &self.config.qbv_group,
                            &self.config.qbv_project,
                            &self.config.qbv_issue_type_name,
                        )
                        .await?,
                )
            } else {
                None
            },
        };
        info!("Successfully got all required field values");
        Ok(resolved)
    }

    async fn epic_option(&self, project: &str, field_id: &str, value: &str) -> DomainResult<FieldValue> {
        self.catalog
            .allowed_value_id(field_id, value, project, "Epic")
            .await
    }

    /// Prepare, then process every row.
    pub async fn run(&self, rows: &[PlanRow], options: &ImportOptions) -> DomainResult<ExecutionSummary> {
        let resolved = self.prepare(options).await?;
        let mut summary = ExecutionSummary::new();
        for row in rows {
            self.process_row(row, &resolved, options, &mut summary).await;
        }
        Ok(summary)
    }

    /// Process one row, recording its outcome in `summary`.
    #[instrument(skip_all, fields(row = row.row_number, name = %row.project_name))]
    pub async fn process_row(
        &self,
        row: &PlanRow,
        resolved: &ResolvedOptions,
        options: &ImportOptions,
        summary: &mut ExecutionSummary,
    ) {
        let name = sanitize_summary(&row.project_name);

        let kind = match row.issue_type.as_deref().map(str::parse::<IssueKind>) {
            Some(Ok(kind)) => kind,
            Some(Err(_)) | None => {
                let shown = row.issue_type.as_deref().unwrap_or_default();
                warn!(issue_type = shown, "Unknown issue type");
                summary.fail_task(row.row_number, &name, format!("Unknown issue type '{shown}'"));
                return;
            }
        };
        if options.only.is_some_and(|only| only != kind) {
            debug!(%kind, "Row filtered out");
            return;
        }

        let content = self.row_content(row, &name, summary).await;

        let outcome = match kind {
            IssueKind::Epic => self.import_epic(row, &content, resolved, options, summary).await,
            IssueKind::Qbv => self.import_qbv(&content, resolved, options, summary).await,
            IssueKind::Project => {
                self.update_project(&content, resolved, options, summary)
                    .await
            }
            IssueKind::OnGoing => self.import_ongoing(&content, options, summary).await,
        };

        if let Err(e) = outcome {
            error!(error = %e, "Row failed");
            match e {
                DomainError::ValidationFailed(msg) => summary.fail_field(row.row_number, &name, msg),
                other => summary.fail_task(row.row_number, &name, other),
            }
        }
    }

    /// Description, DoD and assignee for a row. Unresolvable leads are
    /// recorded as failed users; the row continues unassigned.
    async fn row_content(&self, row: &PlanRow, name: &str, summary: &mut ExecutionSummary) -> RowContent {
        let manager = match row.project_manager.as_deref() {
            Some(pm) => match self.resolver.resolve(pm).await {
                Some(id) => id.mention(),
                None => format!("@{pm}"),
            },
            None => "N/A".to_string(),
        };

        let description = format!(
            "{} \n\n**Final DoD:** {}\n**Project Manager:** {}",
            row.description.as_deref().unwrap_or_default(),
            row.final_dod.as_deref().unwrap_or_default(),
            manager
        );

        let assignee = match row.lead.as_deref() {
            Some(lead) => match self.resolver.resolve(lead).await {
                Some(id) => Some(FieldValue::AccountId(id)),
                None => {
                    warn!(lead, row = row.row_number, "Could not find Jira user for lead");
                    summary.fail_user(
                        row.row_number,
                        name,
                        format!("Could not find Jira user for lead '{lead}'"),
                    );
                    None
                }
            },
            None => None,
        };

        RowContent {
            name: name.to_string(),
            description,
            dod: row.quarter_dod.clone().unwrap_or_default(),
            assignee,
        }
    }

    /// Fields of an Epic row, also used to fill project issues.
    fn epic_fields(&self, content: &RowContent, resolved: &ResolvedOptions, project: &str) -> IssueFields {
        let ids = &self.config.fields;
        let mut fields = IssueFields::new()
            .with(FieldKey::Project, FieldValue::Key(project.to_string()))
            .with(FieldKey::Summary, FieldValue::Text(content.name.clone()))
            .with(FieldKey::Description, FieldValue::Text(content.description.clone()))
            .with(FieldKey::custom(&ids.dod), FieldValue::Text(content.dod.clone()))
            .with(FieldKey::custom(&ids.requested_by_group), resolved.requested_by_group.clone())
            .with(FieldKey::custom(&ids.dod_new), FieldValue::Text(content.dod.clone()))
            .with(
                FieldKey::custom(&ids.destination_team),
                FieldValue::Option(self.config.destination_team.clone()),
            )
            .with(FieldKey::custom(&ids.year), resolved.year.clone())
            .with(FieldKey::custom(&ids.quarter), resolved.quarter.clone())
            .with(FieldKey::custom(&ids.in_quarter_plan), resolved.in_quarter_plan.clone())
            .with(FieldKey::Labels, FieldValue::Labels(vec![self.config.label.clone()]));
        if let Some(assignee) = &content.assignee {
            fields.set(FieldKey::Assignee, assignee.clone());
        }
        fields
    }

    /// Whether an issue with `summary` exists in `project`. Search failures
    /// count as "does not exist".
    async fn issue_exists(&self, project: &str, summary: &str) -> bool {
        let jql = duplicate_summary_jql(project, summary);
        match self.tracker.search_issues(&jql, 1, &["summary"]).await {
            Ok(found) => !found.is_empty(),
            Err(e) => {
                error!(error = %e, jql = %jql, "Error checking for existing issue");
                false
            }
        }
    }

    /// Create `fields`, or only validate and log them on a dry run.
    async fn create(
        &self,
        kind: IssueKind,
        fields: &IssueFields,
        content: &RowContent,
        options: &ImportOptions,
        summary: &mut ExecutionSummary,
    ) -> DomainResult<()> {
        fields.validate_for_create()?;
        if options.dry_run {
            info!(%kind, fields = %fields.to_json(), "Dry run: would create issue");
            summary.record_created(kind.label(), &content.name, "dry-run");
            return Ok(());
        }
        let issue = self.tracker.create_issue(fields).await?;
        info!(%kind, key = %issue.key, "Issue created");
        summary.record_created(kind.label(), &content.name, &issue.key);
        Ok(())
    }

    async fn import_epic(
        &self,
        row: &PlanRow,
        content: &RowContent,
        resolved: &ResolvedOptions,
        options: &ImportOptions,
        summary: &mut ExecutionSummary,
    ) -> DomainResult<()> {
        if self.issue_exists(&options.project, &content.name).await {
            info!("Epic already exists, skipping creation");
            summary.record_skipped(format!("Epic: {}", content.name));
            return Ok(());
        }

        let mut fields = self
            .epic_fields(content, resolved, &options.project)
            .with(FieldKey::IssueType, FieldValue::Name("Epic".to_string()));
        if let Some(parent) = &row.parent {
            fields.set(FieldKey::Parent, FieldValue::Key(parent.clone()));
        }
        self.create(IssueKind::Epic, &fields, content, options, summary).await
    }

    async fn import_qbv(
        &self,
        content: &RowContent,
        resolved: &ResolvedOptions,
        options: &ImportOptions,
        summary: &mut ExecutionSummary,
    ) -> DomainResult<()> {
        let qbv_project = &self.config.qbv_project;
        if self.issue_exists(qbv_project, &content.name).await {
            info!("QBV already exists, skipping creation");
            summary.record_skipped(format!("QBV: {}", content.name));
            return Ok(());
        }

        let qbv_group = resolved.qbv_group.clone().ok_or_else(|| {
            DomainError::ValidationFailed("QBV group option was not resolved".to_string())
        })?;
        let ids = &self.config.fields;
        let mut fields = IssueFields::new()
            .with(FieldKey::Project, FieldValue::Key(qbv_project.clone()))
            .with(FieldKey::Summary, FieldValue::Text(content.name.clone()))
            .with(FieldKey::Description, FieldValue::Text(content.description.clone()))
            .with(FieldKey::IssueType, FieldValue::Id(self.config.qbv_issue_type_id.clone()))
            .with(
                FieldKey::custom(&ids.destination_team),
                FieldValue::Option(self.config.destination_team.clone()),
            )
            .with(FieldKey::custom(&ids.year), resolved.year.clone())
            .with(FieldKey::custom(&ids.quarter), resolved.quarter.clone())
            .with(FieldKey::custom(&ids.qbv_group), qbv_group)
            .with(FieldKey::custom(&ids.dod_new), FieldValue::Text(content.dod.clone()))
            .with(FieldKey::Labels, FieldValue::Labels(vec![self.config.label.clone()]));
        if let Some(assignee) = &content.assignee {
            fields.set(FieldKey::Assignee, assignee.clone());
        }
        self.create(IssueKind::Qbv, &fields, content, options, summary).await
    }

    /// Fill the empty fields of the existing issue named like the row.
    async fn update_project(
        &self,
        content: &RowContent,
        resolved: &ResolvedOptions,
        options: &ImportOptions,
        summary: &mut ExecutionSummary,
    ) -> DomainResult<()> {
        let wanted = self.epic_fields(content, resolved, &options.project);
        let field_names: Vec<&str> = wanted.iter().map(|(k, _)| k.as_str()).collect();

        let jql = duplicate_summary_jql(&options.project, &content.name);
        let existing = self.tracker.search_issues(&jql, 1, &field_names).await?;
        let Some(issue) = existing.into_iter().next() else {
            warn!("Project issue not found, cannot update");
            return Err(DomainError::NotFound(
                "Project not found, cannot update.".to_string(),
            ));
        };

        let updates = wanted.filtered(|key, _| {
            let occupied = issue.has_value(key);
            if occupied {
                warn!(field = %key, issue = %issue.key, "Field already contains data");
            }
            !occupied
        });

        let label = IssueKind::Project.label();
        if updates.is_empty() {
            info!(issue = %issue.key, "No fields to update");
            summary.record_skipped(format!("{label}: {} (no fields to update)", content.name));
            return Ok(());
        }

        updates.validate()?;
        if options.dry_run {
            info!(issue = %issue.key, fields = %updates.to_json(), "Dry run: would update issue");
            summary.record_created(label, &content.name, &format!("{} dry-run", issue.key));
            return Ok(());
        }
        self.tracker.update_issue(&issue.key, &updates).await?;
        info!(issue = %issue.key, updated = updates.len(), "Project issue updated");
        summary.record_created(label, &content.name, &issue.key);
        Ok(())
    }

    async fn import_ongoing(
        &self,
        content: &RowContent,
        options: &ImportOptions,
        summary: &mut ExecutionSummary,
    ) -> DomainResult<()> {
        if self.issue_exists(&options.project, &content.name).await {
            info!("On-going issue already exists, skipping creation");
            summary.record_skipped(format!("On-going: {}", content.name));
            return Ok(());
        }

        let ids = &self.config.fields;
        let mut fields = IssueFields::new()
            .with(FieldKey::Project, FieldValue::Key(options.project.clone()))
            .with(FieldKey::Summary, FieldValue::Text(content.name.clone()))
            .with(FieldKey::Description, FieldValue::Text(content.description.clone()))
            .with(FieldKey::IssueType, FieldValue::Name("Story".to_string()))
            .with(FieldKey::Parent, FieldValue::Key(self.config.ongoing_parent.clone()))
            .with(FieldKey::custom(&ids.dod_new), FieldValue::Text(content.dod.clone()))
            .with(
                FieldKey::custom(&ids.destination_team),
                FieldValue::Option(self.config.destination_team.clone()),
            )
            .with(FieldKey::Labels, FieldValue::Labels(vec![self.config.label.clone()]));
        if let Some(assignee) = &content.assignee {
            fields.set(FieldKey::Assignee, assignee.clone());
        }
        self.create(IssueKind::OnGoing, &fields, content, options, summary).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{DirectoryEntry, ResolverConfig};
    use crate::services::testing::{FakeDirectory, FakeTracker};
    use serde_json::json;

    const QUARTER: &str = "customfield_10257";
    const YEAR: &str = "customfield_10268";
    const REQUESTED_BY: &str = "customfield_10265";
    const IN_PLAN: &str = "customfield_10239";
    const QBV_GROUP: &str = "customfield_10256";
    const DOD: &str = "customfield_10269";
    const DOD_NEW: &str = "customfield_10115";
    const DEST_TEAM: &str = "customfield_10114";

    fn config() -> ImportConfig {
        ImportConfig {
            year: Some(2025),
            ..ImportConfig::default()
        }
    }

    fn tracker() -> FakeTracker {
        FakeTracker::default()
            .with_me(DirectoryEntry::new("me", "Import Bot", "bot@example.com", "bot"))
            .with_project("ITDVPS")
            .with_options("ITDVPS", "Epic", REQUESTED_BY, &["Dev", "Ops"])
            .with_options("ITDVPS", "Epic", YEAR, &["2024", "2025"])
            .with_options("ITDVPS", "Epic", QUARTER, &["Q1", "Q2", "Q3", "Q4"])
            .with_options("ITDVPS", "Epic", IN_PLAN, &["Yes", "No"])
            .with_options("CQ", "QBV", QBV_GROUP, &["CSI", "Other"])
    }

    fn importer(tracker: Arc<FakeTracker>) -> RowImporter {
        let directory = Arc::new(FakeDirectory::new(vec![
            DirectoryEntry::new("jdoe", "Jane Doe", "jane@other.org", "acc-jane"),
            DirectoryEntry::new("rroe", "Rick Roe", "rick@other.org", "acc-rick"),
        ]));
        let resolver = UserResolver::new(directory, ResolverConfig::default());
        RowImporter::new(tracker, resolver, config())
    }

    fn options() -> ImportOptions {
        ImportOptions {
            project: "ITDVPS".to_string(),
            quarter: "Q3".to_string(),
            only: None,
            dry_run: false,
        }
    }

    fn row(n: usize, name: &str, kind: &str) -> PlanRow {
        PlanRow {
            row_number: n,
            project_name: name.to_string(),
            final_dod: Some("Everything migrated".to_string()),
            quarter_dod: Some("Half migrated".to_string()),
            project_manager: Some("Jane Doe".to_string()),
            issue_type: Some(kind.to_string()),
            description: Some("Move the runners".to_string()),
            lead: Some("Rick Roe".to_string()),
            parent: None,
        }
    }

    fn value<'a>(fields: &'a IssueFields, key: &str) -> &'a FieldValue {
        fields
            .iter()
            .find(|(k, _)| k.as_str() == key)
            .map(|(_, v)| v)
            .unwrap_or_else(|| panic!("missing field {key}"))
    }

    #[test]
    fn test_next_quarter_wraps() {
        let day = |m| NaiveDate::from_ymd_opt(2025, m, 15).unwrap();
        assert_eq!(next_quarter(day(1)), "Q2");
        assert_eq!(next_quarter(day(5)), "Q3");
        assert_eq!(next_quarter(day(9)), "Q4");
        assert_eq!(next_quarter(day(12)), "Q1");
    }

    #[test]
    fn test_duplicate_jql_escapes_quotes() {
        assert_eq!(
            duplicate_summary_jql("ITDVPS", "Upgrade runners"),
            r#"project = "ITDVPS" AND summary ~ "Upgrade runners""#
        );
        assert_eq!(
            duplicate_summary_jql("ITDVPS", r#"a "b" \c"#),
            r#"project = "ITDVPS" AND summary ~ "a \"b\" \\c""#
        );
    }

    #[tokio::test]
    async fn test_prepare_resolves_option_ids() {
        let importer = importer(Arc::new(tracker()));
        let resolved = importer.prepare(&options()).await.unwrap();
        assert_eq!(resolved.quarter, FieldValue::Id(format!("{QUARTER}:Q3")));
        assert_eq!(resolved.year, FieldValue::Id(format!("{YEAR}:2025")));
        assert_eq!(resolved.in_quarter_plan, FieldValue::Id(format!("{IN_PLAN}:Yes")));
        assert_eq!(resolved.qbv_group, Some(FieldValue::Id(format!("{QBV_GROUP}:CSI"))));
    }

    #[tokio::test]
    async fn test_prepare_fails_without_auth_or_project() {
        let unauthenticated = FakeTracker::default().with_project("ITDVPS");
        let err = importer(Arc::new(unauthenticated))
            .prepare(&options())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized(_)));

        let mut opts = options();
        opts.project = "NOPE".to_string();
        let err = importer(Arc::new(tracker())).prepare(&opts).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_prepare_rejects_bad_quarter() {
        let mut opts = options();
        opts.quarter = "Q5".to_string();
        let err = importer(Arc::new(tracker())).prepare(&opts).await.unwrap_err();
        assert!(err.to_string().contains("Q5"));
    }

    #[tokio::test]
    async fn test_epic_row_creates_full_field_set() {
        let tracker = Arc::new(tracker());
        let importer = importer(tracker.clone());
        let mut epic = row(2, "Upgrade \"CI\" runners", "Epic");
        epic.parent = Some("ITDVPS-1".to_string());

        let summary = importer.run(&[epic], &options()).await.unwrap();
        assert!(!summary.has_failures(), "{summary:?}");
        assert_eq!(summary.created, vec!["Epic: Upgrade 'CI' runners (ITDVPS-1)"]);

        let created = tracker.created();
        assert_eq!(created.len(), 1);
        let fields = &created[0];
        assert_eq!(value(fields, "summary"), &FieldValue::Text("Upgrade 'CI' runners".to_string()));
        assert_eq!(value(fields, "issuetype"), &FieldValue::Name("Epic".to_string()));
        assert_eq!(value(fields, "parent"), &FieldValue::Key("ITDVPS-1".to_string()));
        assert_eq!(value(fields, "assignee"), &FieldValue::AccountId("acc-rick".into()));
        assert_eq!(value(fields, DOD), &FieldValue::Text("Half migrated".to_string()));
        assert_eq!(value(fields, DOD_NEW), &FieldValue::Text("Half migrated".to_string()));
        assert_eq!(value(fields, DEST_TEAM), &FieldValue::Option("IT_DevOps Team".to_string()));
        assert_eq!(value(fields, REQUESTED_BY), &FieldValue::Id(format!("{REQUESTED_BY}:Dev")));
        assert_eq!(value(fields, "labels"), &FieldValue::Labels(vec!["excel2jira".to_string()]));
        assert_eq!(
            value(fields, "description"),
            &FieldValue::Text(
                "Move the runners \n\n**Final DoD:** Everything migrated\n**Project Manager:** @[~acc-jane]"
                    .to_string()
            )
        );
    }

    #[tokio::test]
    async fn test_existing_epic_is_skipped() {
        let tracker = Arc::new(
            tracker().with_existing("ITDVPS-5", json!({ "summary": "Upgrade runners" })),
        );
        let importer = importer(tracker.clone());

        let summary = importer
            .run(&[row(2, "Upgrade runners", "epic")], &options())
            .await
            .unwrap();
        assert_eq!(summary.skipped, vec!["Epic: Upgrade runners"]);
        assert!(tracker.created().is_empty());
        assert_eq!(
            tracker.searches(),
            vec![r#"project = "ITDVPS" AND summary ~ "Upgrade runners""#]
        );
    }

    #[tokio::test]
    async fn test_search_failure_counts_as_absent() {
        let tracker = Arc::new(FakeTracker {
            fail_search: true,
            ..tracker()
        });
        let importer = importer(tracker.clone());
        let summary = importer
            .run(&[row(2, "Upgrade runners", "on-going")], &options())
            .await
            .unwrap();
        assert_eq!(tracker.created().len(), 1);
        assert_eq!(summary.created.len(), 1);
    }

    #[tokio::test]
    async fn test_qbv_row_goes_to_qbv_project() {
        let tracker = Arc::new(tracker());
        let importer = importer(tracker.clone());

        let summary = importer
            .run(&[row(2, "Customer value", "QBV")], &options())
            .await
            .unwrap();
        assert_eq!(summary.created, vec!["QBV: Customer value (CQ-1)"]);

        let fields = &tracker.created()[0];
        assert_eq!(value(fields, "project"), &FieldValue::Key("CQ".to_string()));
        assert_eq!(value(fields, "issuetype"), &FieldValue::Id("10222".to_string()));
        assert_eq!(value(fields, QBV_GROUP), &FieldValue::Id(format!("{QBV_GROUP}:CSI")));
        assert!(!fields.contains(&FieldKey::custom(DOD)));
        assert!(!fields.contains(&FieldKey::custom(IN_PLAN)));
        assert_eq!(tracker.searches()[0], r#"project = "CQ" AND summary ~ "Customer value""#);
    }

    #[tokio::test]
    async fn test_ongoing_row_creates_story_under_parent() {
        let tracker = Arc::new(tracker());
        let importer = importer(tracker.clone());

        importer
            .run(&[row(2, "Patch servers", "On-going")], &options())
            .await
            .unwrap();

        let fields = &tracker.created()[0];
        assert_eq!(value(fields, "issuetype"), &FieldValue::Name("Story".to_string()));
        assert_eq!(value(fields, "parent"), &FieldValue::Key("ITDVPS-976".to_string()));
        assert!(!fields.contains(&FieldKey::custom(QUARTER)));
    }

    #[tokio::test]
    async fn test_project_row_fills_only_empty_fields() {
        let tracker = Arc::new(tracker().with_existing(
            "ITDVPS-40",
            json!({
                "project": { "key": "ITDVPS" },
                "summary": "Legacy platform",
                "description": "Already described",
                "customfield_10269": null,
                "customfield_10257": { "id": "x", "value": "Q1" },
                "labels": []
            }),
        ));
        let importer = importer(tracker.clone());

        let summary = importer
            .run(&[row(2, "Legacy platform", "project")], &options())
            .await
            .unwrap();
        assert_eq!(summary.created, vec!["Project Update: Legacy platform (ITDVPS-40)"]);

        let updated = tracker.updated();
        assert_eq!(updated.len(), 1);
        let (key, fields) = &updated[0];
        assert_eq!(key, "ITDVPS-40");
        assert!(!fields.contains(&FieldKey::Summary));
        assert!(!fields.contains(&FieldKey::Description));
        assert!(!fields.contains(&FieldKey::custom(QUARTER)));
        assert!(fields.contains(&FieldKey::custom(DOD)));
        assert!(fields.contains(&FieldKey::Labels));
        assert!(fields.contains(&FieldKey::Assignee));
        assert!(!fields.contains(&FieldKey::IssueType));
    }

    #[tokio::test]
    async fn test_dry_run_project_update_is_tagged() {
        let tracker = Arc::new(tracker().with_existing(
            "ITDVPS-40",
            json!({
                "project": { "key": "ITDVPS" },
                "summary": "Legacy platform",
                "customfield_10269": null
            }),
        ));
        let importer = importer(tracker.clone());
        let options = ImportOptions {
            dry_run: true,
            ..options()
        };

        let summary = importer
            .run(&[row(2, "Legacy platform", "project")], &options)
            .await
            .unwrap();
        assert_eq!(
            summary.created,
            vec!["Project Update: Legacy platform (ITDVPS-40 dry-run)"]
        );
        assert!(tracker.updated().is_empty());
    }

    #[tokio::test]
    async fn test_project_row_without_empty_fields_is_skipped() {
        let occupied: serde_json::Map<String, serde_json::Value> = [
            "project", "summary", "description", DOD, REQUESTED_BY, DOD_NEW, DEST_TEAM, YEAR,
            QUARTER, IN_PLAN, "labels", "assignee",
        ]
        .iter()
        .map(|k| ((*k).to_string(), json!("set")))
        .collect();
        let mut fields = serde_json::Value::Object(occupied);
        fields["summary"] = json!("Legacy platform");

        let tracker = Arc::new(tracker().with_existing("ITDVPS-40", fields));
        let importer = importer(tracker.clone());

        let summary = importer
            .run(&[row(2, "Legacy platform", "project")], &options())
            .await
            .unwrap();
        assert_eq!(
            summary.skipped,
            vec!["Project Update: Legacy platform (no fields to update)"]
        );
        assert!(tracker.updated().is_empty());
    }

    #[tokio::test]
    async fn test_missing_project_issue_is_failed_task() {
        let importer = importer(Arc::new(tracker()));
        let summary = importer
            .run(&[row(7, "Ghost project", "project")], &options())
            .await
            .unwrap();
        assert_eq!(summary.failed_tasks.len(), 1);
        assert!(summary.failed_tasks[0].starts_with("Row 7: Ghost project - "));
        assert!(summary.failed_tasks[0].contains("Project not found"));
    }

    #[tokio::test]
    async fn test_unknown_type_and_unresolved_lead() {
        let tracker = Arc::new(tracker());
        let importer = importer(tracker.clone());

        let mut ghost_lead = row(3, "Lonely epic", "epic");
        ghost_lead.lead = Some("Nobody Known".to_string());
        ghost_lead.project_manager = Some("Nobody Known".to_string());

        let summary = importer
            .run(&[row(2, "Mystery", "story"), ghost_lead], &options())
            .await
            .unwrap();

        assert_eq!(summary.failed_tasks, vec!["Row 2: Mystery - Unknown issue type 'story'"]);
        assert_eq!(
            summary.failed_users,
            vec!["Row 3: Lonely epic - Could not find Jira user for lead 'Nobody Known'"]
        );

        let fields = &tracker.created()[0];
        assert!(!fields.contains(&FieldKey::Assignee));
        match value(fields, "description") {
            FieldValue::Text(d) => assert!(d.ends_with("**Project Manager:** @Nobody Known")),
            other => panic!("unexpected description {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_rejection_is_recorded_and_run_continues() {
        let tracker = Arc::new(FakeTracker {
            reject_summaries: vec!["Bad one".to_string()],
            ..tracker()
        });
        let importer = importer(tracker.clone());

        let summary = importer
            .run(&[row(2, "Bad one", "epic"), row(3, "Good one", "epic")], &options())
            .await
            .unwrap();
        assert_eq!(summary.failed_tasks.len(), 1);
        assert!(summary.failed_tasks[0].contains("400"));
        assert_eq!(summary.created, vec!["Epic: Good one (ITDVPS-1)"]);
    }

    #[tokio::test]
    async fn test_only_filter_and_dry_run() {
        let tracker = Arc::new(tracker());
        let importer = importer(tracker.clone());
        let opts = ImportOptions {
            only: Some(IssueKind::OnGoing),
            dry_run: true,
            ..options()
        };

        let summary = importer
            .run(&[row(2, "Epic row", "epic"), row(3, "Story row", "on-going")], &opts)
            .await
            .unwrap();
        assert_eq!(summary.created, vec!["On-going: Story row (dry-run)"]);
        assert!(tracker.created().is_empty());
    }

    #[tokio::test]
    async fn test_bad_label_is_failed_field() {
        let tracker = Arc::new(tracker());
        let directory = Arc::new(FakeDirectory::default());
        let resolver = UserResolver::new(directory, ResolverConfig::default());
        let importer = RowImporter::new(
            tracker.clone(),
            resolver,
            ImportConfig {
                label: "two words".to_string(),
                ..config()
            },
        );

        let mut plain = row(2, "Epic row", "epic");
        plain.lead = None;
        let summary = importer.run(&[plain], &options()).await.unwrap();
        assert_eq!(summary.failed_fields.len(), 1);
        assert!(summary.failed_fields[0].contains("two words"));
        assert!(tracker.created().is_empty());
    }
}
