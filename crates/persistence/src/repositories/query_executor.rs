//! Executes report SQL against Postgres.
//!
//! Column names and kinds come from the prepared statement, so a query that
//! returns no rows still produces a header. Values are decoded per declared
//! Postgres type.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use domain::models::{CellValue, Column, ColumnKind, TabularResult};
use domain::services::QueryExecutor;
use domain::ExportError;
use sqlx::postgres::PgRow;
use sqlx::{Column as _, Executor, PgPool, Row, Statement, TypeInfo};
use uuid::Uuid;

use crate::metrics::{QueryTimer, ReportQueryOutcome};

/// Postgres types a report column may have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PgColumnType {
    Int2,
    Int4,
    Int8,
    Float4,
    Float8,
    Bool,
    Text,
    Timestamp,
    Timestamptz,
    Date,
    Uuid,
}

impl PgColumnType {
    fn from_type_name(name: &str) -> Option<Self> {
        let column_type = match name {
            "INT2" => Self::Int2,
            "INT4" => Self::Int4,
            "INT8" => Self::Int8,
            "FLOAT4" => Self::Float4,
            "FLOAT8" => Self::Float8,
            "BOOL" => Self::Bool,
            "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" | "CITEXT" => Self::Text,
            "TIMESTAMP" => Self::Timestamp,
            "TIMESTAMPTZ" => Self::Timestamptz,
            "DATE" => Self::Date,
            "UUID" => Self::Uuid,
            _ => return None,
        };
        Some(column_type)
    }

    fn kind(self) -> ColumnKind {
        match self {
            Self::Int2 | Self::Int4 | Self::Int8 => ColumnKind::Integer,
            Self::Float4 | Self::Float8 => ColumnKind::Float,
            Self::Bool => ColumnKind::Boolean,
            Self::Text | Self::Uuid => ColumnKind::Text,
            Self::Timestamp | Self::Timestamptz => ColumnKind::Timestamp,
            Self::Date => ColumnKind::Date,
        }
    }

    fn decode(self, row: &PgRow, index: usize) -> Result<CellValue, sqlx::Error> {
        let value = match self {
            Self::Int2 => row.try_get::<Option<i16>, _>(index)?.map(|v| CellValue::Integer(v.into())),
            Self::Int4 => row.try_get::<Option<i32>, _>(index)?.map(|v| CellValue::Integer(v.into())),
            Self::Int8 => row.try_get::<Option<i64>, _>(index)?.map(CellValue::Integer),
            Self::Float4 => row.try_get::<Option<f32>, _>(index)?.map(|v| CellValue::Float(v.into())),
            Self::Float8 => row.try_get::<Option<f64>, _>(index)?.map(CellValue::Float),
            Self::Bool => row.try_get::<Option<bool>, _>(index)?.map(CellValue::Boolean),
            Self::Text => row.try_get::<Option<String>, _>(index)?.map(CellValue::Text),
            Self::Timestamp => row
                .try_get::<Option<NaiveDateTime>, _>(index)?
                .map(CellValue::Timestamp),
            // Rendered in UTC.
            Self::Timestamptz => row
                .try_get::<Option<DateTime<Utc>>, _>(index)?
                .map(|v| CellValue::Timestamp(v.naive_utc())),
            Self::Date => row.try_get::<Option<NaiveDate>, _>(index)?.map(CellValue::Date),
            Self::Uuid => row
                .try_get::<Option<Uuid>, _>(index)?
                .map(|v| CellValue::Text(v.to_string())),
        };
        Ok(value.unwrap_or(CellValue::Null))
    }
}

/// Query executor backed by the shared connection pool.
#[derive(Clone)]
pub struct PgQueryExecutor {
    pool: PgPool,
    query_timeout: Duration,
}

impl PgQueryExecutor {
    pub fn new(pool: PgPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    async fn run(&self, sql: &str) -> Result<TabularResult, ExportError> {
        let statement = (&self.pool).prepare(sql).await.map_err(database_error)?;

        let mut columns = Vec::with_capacity(statement.columns().len());
        let mut column_types = Vec::with_capacity(statement.columns().len());
        for column in statement.columns() {
            let type_name = column.type_info().name();
            let column_type = PgColumnType::from_type_name(type_name).ok_or_else(|| {
                ExportError::DatabaseReadFailure(format!(
                    "column '{}' has unsupported type {}",
                    column.name(),
                    type_name
                ))
            })?;
            columns.push(Column::new(column.name(), column_type.kind()));
            column_types.push(column_type);
        }

        let rows = sqlx::query(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(database_error)?;

        let mut cells = Vec::with_capacity(rows.len());
        for row in &rows {
            let values = column_types
                .iter()
                .enumerate()
                .map(|(index, column_type)| column_type.decode(row, index))
                .collect::<Result<Vec<_>, _>>()
                .map_err(database_error)?;
            cells.push(values);
        }

        TabularResult::new(columns, cells)
    }
}

fn database_error(err: sqlx::Error) -> ExportError {
    ExportError::DatabaseReadFailure(err.to_string())
}

#[async_trait]
impl QueryExecutor for PgQueryExecutor {
    async fn execute(&self, sql: &str) -> Result<TabularResult, ExportError> {
        let timer = QueryTimer::new("execute_report_query");

        match tokio::time::timeout(self.query_timeout, self.run(sql)).await {
            Ok(Ok(result)) => {
                timer.record_report(ReportQueryOutcome::Completed, Some(result.row_count()));
                Ok(result)
            }
            Ok(Err(e)) => {
                timer.record_report(ReportQueryOutcome::Failed, None);
                Err(e)
            }
            Err(_) => {
                timer.record_report(ReportQueryOutcome::TimedOut, None);
                Err(ExportError::DatabaseReadFailure(format!(
                    "query timed out after {}s",
                    self.query_timeout.as_secs_f64()
                )))
            }
        }
    }
}
