//! Best-effort persistence of execution records.

use async_trait::async_trait;
use std::sync::Arc;

use flowline_steps::CollabError;

use crate::engine::ExecutionRecord;

/// Sink the engine appends execution records to.
///
/// Fire-and-forget from the engine's perspective: the recorder swallows
/// append failures.
#[async_trait]
pub trait ExecutionLogSink: Send + Sync {
    /// Persist one record.
    async fn append(&self, record: &ExecutionRecord) -> Result<(), CollabError>;
}

/// Sink that only traces records; used when no database is configured.
pub struct TracingLogSink;

#[async_trait]
impl ExecutionLogSink for TracingLogSink {
    async fn append(&self, record: &ExecutionRecord) -> Result<(), CollabError> {
        tracing::info!(
            execution_id = %record.execution_id,
            workflow_id = %record.workflow_id,
            status = %record.status,
            steps_completed = record.steps_completed,
            total_steps = record.total_steps,
            execution_time_ms = record.execution_time_ms,
            "Execution record"
        );
        Ok(())
    }
}

/// Persists execution records without ever failing the run.
pub struct ExecutionRecorder {
    sink: Arc<dyn ExecutionLogSink>,
}

impl ExecutionRecorder {
    /// Create a recorder over a sink.
    pub fn new(sink: Arc<dyn ExecutionLogSink>) -> Self {
        Self { sink }
    }

    /// Persist a record. Failures are logged and swallowed; they never
    /// change the run's reported status or propagate to the caller.
    pub async fn record(&self, record: &ExecutionRecord) {
        if let Err(e) = self.sink.append(record).await {
            tracing::warn!(
                execution_id = %record.execution_id,
                error = %e,
                "Failed to persist execution record"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{RunStatus, TriggerKind};
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use uuid::Uuid;

    struct FailingSink;

    #[async_trait]
    impl ExecutionLogSink for FailingSink {
        async fn append(&self, _record: &ExecutionRecord) -> Result<(), CollabError> {
            Err(CollabError::Unavailable("log store down".to_string()))
        }
    }

    struct CapturingSink {
        records: Mutex<Vec<ExecutionRecord>>,
    }

    #[async_trait]
    impl ExecutionLogSink for CapturingSink {
        async fn append(&self, record: &ExecutionRecord) -> Result<(), CollabError> {
            self.records.lock().unwrap().push(record.clone());
            Ok(())
        }
    }

    fn record() -> ExecutionRecord {
        ExecutionRecord {
            execution_id: Uuid::new_v4(),
            workflow_id: "wf-1".to_string(),
            user_id: "user-1".to_string(),
            trigger: TriggerKind::Manual,
            status: RunStatus::Completed,
            results: HashMap::new(),
            error: None,
            execution_time_ms: 1,
            steps_completed: 0,
            total_steps: 0,
            started_at: Utc::now(),
            finished_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_sink_failure_is_swallowed() {
        let recorder = ExecutionRecorder::new(Arc::new(FailingSink));
        // Must not panic or propagate.
        recorder.record(&record()).await;
    }

    #[tokio::test]
    async fn test_record_reaches_sink() {
        let sink = Arc::new(CapturingSink {
            records: Mutex::new(Vec::new()),
        });
        let recorder = ExecutionRecorder::new(sink.clone());

        recorder.record(&record()).await;
        assert_eq!(sink.records.lock().unwrap().len(), 1);
    }
}
