//! Application services and external integrations.

pub mod graph;
pub mod report_export;
pub mod stream_publisher;

pub use graph::GraphUserDirectory;
pub use report_export::{ReportExportService, StartedExport};
pub use stream_publisher::{publish, PendingPublish, PublishError};
