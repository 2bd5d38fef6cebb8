//! Collaborator contracts of the export pipeline.
//!
//! The pipeline never talks to the database directly; it goes through these
//! traits. Postgres-backed implementations live in the persistence crate;
//! the in-memory implementations here back local profiles and tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::error::ExportError;
use crate::models::{ReportDefinition, ReportTrackingRecord, TabularResult};

/// Read-only lookup of report definitions.
#[async_trait::async_trait]
pub trait ReportDefinitionStore: Send + Sync {
    /// Find a definition by id. `Ok(None)` when the id is unknown.
    async fn find_by_id(&self, id: i64) -> Result<Option<ReportDefinition>, ExportError>;

    /// List definitions ordered by name, optionally restricted to one report group.
    async fn list(&self, group: Option<&str>) -> Result<Vec<ReportDefinition>, ExportError>;
}

/// Runs a report's SQL and returns the tabular result.
#[async_trait::async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute(&self, sql: &str) -> Result<TabularResult, ExportError>;
}

/// Appends tracking records for completed exports.
#[async_trait::async_trait]
pub trait TrackingRecorder: Send + Sync {
    async fn record(&self, record: &ReportTrackingRecord) -> Result<(), ExportError>;
}

/// In-memory definition store.
#[derive(Debug, Default)]
pub struct InMemoryReportStore {
    definitions: Vec<ReportDefinition>,
    groups: HashMap<String, Vec<i64>>,
}

impl InMemoryReportStore {
    pub fn new(definitions: Vec<ReportDefinition>) -> Self {
        Self {
            definitions,
            groups: HashMap::new(),
        }
    }

    /// Add a report to a named group.
    pub fn with_group_member(mut self, group: impl Into<String>, report_id: i64) -> Self {
        self.groups.entry(group.into()).or_default().push(report_id);
        self
    }
}

#[async_trait::async_trait]
impl ReportDefinitionStore for InMemoryReportStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<ReportDefinition>, ExportError> {
        Ok(self.definitions.iter().find(|d| d.id == id).cloned())
    }

    async fn list(&self, group: Option<&str>) -> Result<Vec<ReportDefinition>, ExportError> {
        let mut definitions: Vec<ReportDefinition> = match group {
            Some(group) => {
                let members = self.groups.get(group).cloned().unwrap_or_default();
                self.definitions
                    .iter()
                    .filter(|d| members.contains(&d.id))
                    .cloned()
                    .collect()
            }
            None => self.definitions.clone(),
        };
        definitions.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(definitions)
    }
}

/// Query executor returning a canned result, or failing on demand.
///
/// Counts invocations so callers can assert the executor was (not) reached.
#[derive(Debug)]
pub struct MockQueryExecutor {
    result: Option<TabularResult>,
    failure: Option<String>,
    calls: AtomicUsize,
}

impl MockQueryExecutor {
    /// Executor that returns `result` for every query.
    pub fn returning(result: TabularResult) -> Self {
        Self {
            result: Some(result),
            failure: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Executor that fails every query with a `DatabaseReadFailure`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            result: None,
            failure: Some(message.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl QueryExecutor for MockQueryExecutor {
    async fn execute(&self, _sql: &str) -> Result<TabularResult, ExportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match (&self.result, &self.failure) {
            (_, Some(message)) => Err(ExportError::DatabaseReadFailure(message.clone())),
            (Some(result), None) => Ok(result.clone()),
            (None, None) => Err(ExportError::DatabaseReadFailure(
                "no result configured".to_string(),
            )),
        }
    }
}

/// Tracking recorder that keeps records in memory.
#[derive(Debug, Default)]
pub struct MemoryTrackingRecorder {
    records: Mutex<Vec<ReportTrackingRecord>>,
    fail: bool,
}

impl MemoryTrackingRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorder whose writes always fail.
    pub fn failing() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn records(&self) -> Vec<ReportTrackingRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl TrackingRecorder for MemoryTrackingRecorder {
    async fn record(&self, record: &ReportTrackingRecord) -> Result<(), ExportError> {
        if self.fail {
            return Err(ExportError::DatabaseReadFailure(
                "tracking store unavailable".to_string(),
            ));
        }
        self.records
            .lock()
            .map_err(|_| ExportError::DatabaseReadFailure("tracking store poisoned".to_string()))?
            .push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Column, FileExtension};
    use chrono::Utc;

    fn definitions() -> Vec<ReportDefinition> {
        vec![
            ReportDefinition::new(1, "Zeta", "SELECT 1", FileExtension::Csv),
            ReportDefinition::new(2, "Alpha", "SELECT 2", FileExtension::Xlsx),
            ReportDefinition::new(3, "Mid", "SELECT 3", FileExtension::Csv),
        ]
    }

    #[tokio::test]
    async fn test_in_memory_store_find() {
        let store = InMemoryReportStore::new(definitions());
        assert_eq!(store.find_by_id(2).await.unwrap().unwrap().name, "Alpha");
        assert!(store.find_by_id(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_in_memory_store_list_sorted_by_name() {
        let store = InMemoryReportStore::new(definitions());
        let names: Vec<String> = store
            .list(None)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["Alpha", "Mid", "Zeta"]);
    }

    #[tokio::test]
    async fn test_in_memory_store_list_by_group() {
        let store = InMemoryReportStore::new(definitions())
            .with_group_member("finance", 1)
            .with_group_member("finance", 3);

        let ids: Vec<i64> = store
            .list(Some("finance"))
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec![3, 1]);
        assert!(store.list(Some("hr")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mock_executor_counts_calls() {
        let result = TabularResult::new(vec![Column::text("A")], vec![]).unwrap();
        let executor = MockQueryExecutor::returning(result.clone());
        assert_eq!(executor.calls(), 0);
        assert_eq!(executor.execute("SELECT").await.unwrap(), result);
        assert_eq!(executor.calls(), 1);
    }

    #[tokio::test]
    async fn test_mock_executor_failure() {
        let executor = MockQueryExecutor::failing("connection refused");
        let err = executor.execute("SELECT").await.unwrap_err();
        assert!(matches!(err, ExportError::DatabaseReadFailure(_)));
        assert_eq!(executor.calls(), 1);
    }

    #[tokio::test]
    async fn test_memory_tracking_recorder() {
        let recorder = MemoryTrackingRecorder::new();
        let record = ReportTrackingRecord::new(1, "u", Utc::now(), "csv/a.csv");
        recorder.record(&record).await.unwrap();
        assert_eq!(recorder.records(), vec![record]);

        let failing = MemoryTrackingRecorder::failing();
        let record = ReportTrackingRecord::new(1, "u", Utc::now(), "csv/a.csv");
        assert!(failing.record(&record).await.is_err());
        assert!(failing.records().is_empty());
    }
}
