//! Infrastructure layer module
//!
//! - Configuration management (figment)
//! - Logging infrastructure (tracing) and secret scrubbing
//! - Spreadsheet and plan readers

pub mod config;
pub mod logging;
pub mod sheets;
