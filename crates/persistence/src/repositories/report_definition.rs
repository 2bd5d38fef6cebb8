//! Report definition repository for database operations.

use async_trait::async_trait;
use domain::models::ReportDefinition;
use domain::services::ReportDefinitionStore;
use domain::ExportError;
use sqlx::PgPool;

use crate::entities::ReportDefinitionEntity;
use crate::metrics::QueryTimer;

/// Repository for report definitions and their group associations.
#[derive(Clone)]
pub struct ReportDefinitionRepository {
    pool: PgPool,
}

impl ReportDefinitionRepository {
    /// Creates a new ReportDefinitionRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a definition row by id.
    pub async fn find_entity_by_id(
        &self,
        id: i64,
    ) -> Result<Option<ReportDefinitionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_report_definition_by_id");
        let result = sqlx::query_as::<_, ReportDefinitionEntity>(
            r#"
            SELECT id, report_name, query, file_extension, sheet_number,
                   created_by, created_at
            FROM reporting.report_definitions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List definition rows ordered by name, optionally limited to one group.
    pub async fn list_entities(
        &self,
        group: Option<&str>,
    ) -> Result<Vec<ReportDefinitionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_report_definitions");
        let result = sqlx::query_as::<_, ReportDefinitionEntity>(
            r#"
            SELECT d.id, d.report_name, d.query, d.file_extension, d.sheet_number,
                   d.created_by, d.created_at
            FROM reporting.report_definitions d
            WHERE $1::text IS NULL
               OR EXISTS (
                   SELECT 1
                   FROM reporting.report_query_groups g
                   WHERE g.report_id = d.id AND g.group_name = $1
               )
            ORDER BY d.report_name, d.id
            "#,
        )
        .bind(group)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}

#[async_trait]
impl ReportDefinitionStore for ReportDefinitionRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<ReportDefinition>, ExportError> {
        self.find_entity_by_id(id)
            .await
            .map_err(|e| ExportError::DatabaseReadFailure(e.to_string()))?
            .map(ReportDefinitionEntity::into_domain)
            .transpose()
    }

    async fn list(&self, group: Option<&str>) -> Result<Vec<ReportDefinition>, ExportError> {
        let entities = self
            .list_entities(group)
            .await
            .map_err(|e| ExportError::DatabaseReadFailure(e.to_string()))?;

        let mut definitions = Vec::with_capacity(entities.len());
        for entity in entities {
            let id = entity.id;
            match entity.into_domain() {
                Ok(definition) => definitions.push(definition),
                // One misconfigured row should not hide every other report.
                Err(e) => tracing::warn!(report_id = id, error = %e, "Skipping report definition"),
            }
        }
        Ok(definitions)
    }
}
