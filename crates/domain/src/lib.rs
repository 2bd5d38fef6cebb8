//! Domain layer for the report service.
//!
//! This crate contains:
//! - Report models (definitions, tabular results, artifacts, tracking records)
//! - The CSV / XLSX encoder
//! - Collaborator traits for storage, query execution and identity lookup
//! - Domain error types

pub mod error;
pub mod models;
pub mod services;

pub use error::{DirectoryError, ExportError};
