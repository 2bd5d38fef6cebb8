//! Domain services and collaborator contracts.

pub mod directory;
pub mod encoder;
pub mod reporting;

pub use directory::{StubUserDirectory, UserDirectory};
pub use encoder::{artifact_filename, encode, encode_csv, encode_xlsx, sheet_name, XlsxWorkbook};
pub use reporting::{
    InMemoryReportStore, MemoryTrackingRecorder, MockQueryExecutor, QueryExecutor,
    ReportDefinitionStore, TrackingRecorder,
};
