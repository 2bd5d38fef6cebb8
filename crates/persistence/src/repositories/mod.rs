//! Repository implementations for database operations.

pub mod query_executor;
pub mod report_definition;
pub mod report_tracking;

pub use query_executor::PgQueryExecutor;
pub use report_definition::ReportDefinitionRepository;
pub use report_tracking::ReportTrackingRepository;
