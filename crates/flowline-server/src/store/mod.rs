//! Workflow store backends.

mod file;
mod postgres;

pub use file::FileWorkflowStore;
pub use postgres::{connect, PgExecutionLog, PgWorkflowStore};

use async_trait::async_trait;

use flowline_steps::collab::NotificationTemplate;
use flowline_steps::CollabError;

use crate::workflow::WorkflowDefinition;

/// Read-side store the engine loads workflow definitions from.
///
/// Implementations also expose notification templates; the notification
/// executor consumes that half through the narrower
/// [`flowline_steps::collab::TemplateProvider`] trait.
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    /// Fetch a workflow definition by id.
    async fn get_workflow(&self, id: &str) -> Result<Option<WorkflowDefinition>, CollabError>;

    /// Fetch a notification template by id.
    async fn get_notification_template(
        &self,
        id: &str,
    ) -> Result<Option<NotificationTemplate>, CollabError>;
}
