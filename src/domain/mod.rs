//! Domain layer for issuebridge
//!
//! This module contains the core models, errors and the port traits that
//! tracker adapters implement.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
