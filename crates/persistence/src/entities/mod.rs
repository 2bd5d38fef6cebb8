//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod report_definition;
pub mod report_tracking;

pub use report_definition::ReportDefinitionEntity;
pub use report_tracking::ReportTrackingEntity;
