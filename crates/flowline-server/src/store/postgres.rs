//! PostgreSQL-backed workflow store and execution log sink.

use async_trait::async_trait;
use sqlx::PgPool;

use flowline_steps::collab::{NotificationTemplate, TemplateProvider};
use flowline_steps::CollabError;

use crate::config::DatabaseConfig;
use crate::engine::ExecutionRecord;
use crate::error::AppResult;
use crate::recorder::ExecutionLogSink;
use crate::workflow::{validate_definition, WorkflowDefinition};

/// Schema applied at startup.
const SCHEMA_DDL: &str = r#"
CREATE SCHEMA IF NOT EXISTS flowline;

CREATE TABLE IF NOT EXISTS flowline.workflow (
    workflow_id TEXT PRIMARY KEY,
    definition  JSONB NOT NULL,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS flowline.notification_template (
    template_id TEXT PRIMARY KEY,
    subject     TEXT NOT NULL,
    content     TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS flowline.execution_log (
    execution_id      UUID PRIMARY KEY,
    workflow_id       TEXT NOT NULL,
    user_id           TEXT NOT NULL,
    trigger           TEXT NOT NULL,
    status            TEXT NOT NULL,
    results           JSONB NOT NULL,
    error             TEXT,
    execution_time_ms BIGINT NOT NULL,
    steps_completed   INT NOT NULL,
    total_steps       INT NOT NULL,
    started_at        TIMESTAMPTZ NOT NULL,
    finished_at       TIMESTAMPTZ NOT NULL
);
"#;

/// Open a pool against the configured database and bootstrap the
/// flowline schema.
///
/// The returned pool backs both the workflow store and the execution
/// log sink; a failed bootstrap aborts server startup rather than
/// surfacing later as per-run lookup errors.
pub async fn connect(config: &DatabaseConfig) -> AppResult<PgPool> {
    let options = config.connect_options()?;
    let pool = config.pool_options().connect_with(options).await?;

    ensure_schema(&pool).await?;

    tracing::info!(
        pool_size = config.pool_size,
        connect_timeout = config.connect_timeout,
        "Workflow store ready"
    );

    Ok(pool)
}

/// Create the flowline schema and tables if missing.
async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA_DDL.split(';') {
        let statement = statement.trim();
        if !statement.is_empty() {
            sqlx::query(statement).execute(pool).await?;
        }
    }

    Ok(())
}

/// Workflow store over the `flowline.workflow` and
/// `flowline.notification_template` tables.
#[derive(Clone)]
pub struct PgWorkflowStore {
    db: PgPool,
}

impl PgWorkflowStore {
    /// Create a store over a connection pool.
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl super::WorkflowStore for PgWorkflowStore {
    async fn get_workflow(&self, id: &str) -> Result<Option<WorkflowDefinition>, CollabError> {
        let row: Option<(serde_json::Value,)> =
            sqlx::query_as("SELECT definition FROM flowline.workflow WHERE workflow_id = $1")
                .bind(id)
                .fetch_optional(&self.db)
                .await
                .map_err(|e| CollabError::Unavailable(e.to_string()))?;

        let Some((definition,)) = row else {
            return Ok(None);
        };

        let definition: WorkflowDefinition = serde_json::from_value(definition)
            .map_err(|e| CollabError::Decode(format!("invalid workflow definition: {}", e)))?;

        validate_definition(&definition)
            .map_err(|e| CollabError::Decode(e.to_string()))?;

        Ok(Some(definition))
    }

    async fn get_notification_template(
        &self,
        id: &str,
    ) -> Result<Option<NotificationTemplate>, CollabError> {
        let row: Option<(String, String)> = sqlx::query_as(
            "SELECT subject, content FROM flowline.notification_template WHERE template_id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| CollabError::Unavailable(e.to_string()))?;

        Ok(row.map(|(subject, content)| NotificationTemplate { subject, content }))
    }
}

#[async_trait]
impl TemplateProvider for PgWorkflowStore {
    async fn get_notification_template(
        &self,
        id: &str,
    ) -> Result<Option<NotificationTemplate>, CollabError> {
        super::WorkflowStore::get_notification_template(self, id).await
    }
}

/// Execution log sink over the `flowline.execution_log` table.
#[derive(Clone)]
pub struct PgExecutionLog {
    db: PgPool,
}

impl PgExecutionLog {
    /// Create a sink over a connection pool.
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ExecutionLogSink for PgExecutionLog {
    async fn append(&self, record: &ExecutionRecord) -> Result<(), CollabError> {
        let results = serde_json::to_value(&record.results)
            .map_err(|e| CollabError::Decode(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO flowline.execution_log (
                execution_id, workflow_id, user_id, trigger, status,
                results, error, execution_time_ms, steps_completed,
                total_steps, started_at, finished_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(record.execution_id)
        .bind(&record.workflow_id)
        .bind(&record.user_id)
        .bind(record.trigger.to_string())
        .bind(record.status.to_string())
        .bind(results)
        .bind(&record.error)
        .bind(record.execution_time_ms as i64)
        .bind(record.steps_completed as i32)
        .bind(record.total_steps as i32)
        .bind(record.started_at)
        .bind(record.finished_at)
        .execute(&self.db)
        .await
        .map_err(|e| CollabError::Unavailable(e.to_string()))?;

        Ok(())
    }
}
