//! Domain models for the report service.

pub mod artifact;
pub mod file_extension;
pub mod report_definition;
pub mod tabular;
pub mod tracking;
pub mod user;

pub use artifact::EncodedArtifact;
pub use file_extension::{FileExtension, UnknownFileExtension};
pub use report_definition::{
    ListReportsQuery, ListReportsResponse, ReportDefinition, ReportSummary, REPORTS_PATH,
};
pub use tabular::{CellValue, Column, ColumnKind, TabularResult};
pub use tracking::{output_location, ReportTrackingRecord};
pub use user::UserDetails;
