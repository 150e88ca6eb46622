//! Application services: user resolution and the batch importers.

pub mod bootstrap_service;
pub mod field_catalog;
pub mod import_service;
pub mod run_summary;
pub mod similarity;
pub mod subtask_service;
pub mod user_resolver;

#[cfg(test)]
pub(crate) mod testing;

pub use bootstrap_service::{BootstrapReport, ProjectBootstrapper};
pub use field_catalog::FieldCatalog;
pub use import_service::{
    duplicate_summary_jql, next_quarter, ImportOptions, ResolvedOptions, RowImporter,
};
pub use run_summary::ExecutionSummary;
pub use similarity::ratio;
pub use subtask_service::SubtaskImporter;
pub use user_resolver::UserResolver;
