//! Directory-backed workflow store for development and tests.
//!
//! Loads `.yaml`/`.yml`/`.json` workflow definitions from a directory at
//! startup. An optional `templates.yaml` file in the same directory maps
//! template ids to notification templates.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;

use flowline_steps::collab::{NotificationTemplate, TemplateProvider};
use flowline_steps::CollabError;

use crate::error::{AppError, AppResult};
use crate::workflow::{parse_definition_json, parse_definition_yaml, WorkflowDefinition};

/// File name holding notification templates.
const TEMPLATES_FILE: &str = "templates.yaml";

/// In-memory store loaded from a definitions directory.
pub struct FileWorkflowStore {
    workflows: HashMap<String, WorkflowDefinition>,
    templates: HashMap<String, NotificationTemplate>,
}

impl FileWorkflowStore {
    /// Load every definition in the directory, validating each one.
    pub fn load(dir: impl AsRef<Path>) -> AppResult<Self> {
        let dir = dir.as_ref();
        let mut workflows = HashMap::new();
        let mut templates = HashMap::new();

        let entries = std::fs::read_dir(dir)
            .map_err(|e| AppError::Config(format!("Cannot read workflow dir {:?}: {}", dir, e)))?;

        for entry in entries {
            let entry =
                entry.map_err(|e| AppError::Config(format!("Cannot read dir entry: {}", e)))?;
            let path = entry.path();

            let Some(extension) = path.extension().and_then(|e| e.to_str()) else {
                continue;
            };

            let content = std::fs::read_to_string(&path)
                .map_err(|e| AppError::Config(format!("Cannot read {:?}: {}", path, e)))?;

            if path.file_name().and_then(|n| n.to_str()) == Some(TEMPLATES_FILE) {
                templates = serde_yaml::from_str(&content)
                    .map_err(|e| AppError::Parse(format!("Invalid {}: {}", TEMPLATES_FILE, e)))?;
                continue;
            }

            let definition = match extension {
                "yaml" | "yml" => parse_definition_yaml(&content)?,
                "json" => parse_definition_json(&content)?,
                _ => continue,
            };

            if workflows.contains_key(&definition.id) {
                return Err(AppError::Validation(format!(
                    "Duplicate workflow id '{}' in {:?}",
                    definition.id, path
                )));
            }

            tracing::debug!(workflow_id = %definition.id, path = ?path, "Loaded workflow definition");
            workflows.insert(definition.id.clone(), definition);
        }

        tracing::info!(
            workflows = workflows.len(),
            templates = templates.len(),
            dir = ?dir,
            "File workflow store loaded"
        );

        Ok(Self {
            workflows,
            templates,
        })
    }

    /// Number of loaded workflows.
    pub fn len(&self) -> usize {
        self.workflows.len()
    }

    /// Returns true when no workflows were loaded.
    pub fn is_empty(&self) -> bool {
        self.workflows.is_empty()
    }
}

#[async_trait]
impl super::WorkflowStore for FileWorkflowStore {
    async fn get_workflow(&self, id: &str) -> Result<Option<WorkflowDefinition>, CollabError> {
        Ok(self.workflows.get(id).cloned())
    }

    async fn get_notification_template(
        &self,
        id: &str,
    ) -> Result<Option<NotificationTemplate>, CollabError> {
        Ok(self.templates.get(id).cloned())
    }
}

#[async_trait]
impl TemplateProvider for FileWorkflowStore {
    async fn get_notification_template(
        &self,
        id: &str,
    ) -> Result<Option<NotificationTemplate>, CollabError> {
        Ok(self.templates.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::WorkflowStore;

    fn write(dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    #[tokio::test]
    async fn test_load_and_lookup() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "digest.yaml",
            r#"
id: digest
steps:
  - id: gate
    type: condition
    config:
      conditions: []
"#,
        );
        write(
            dir.path(),
            TEMPLATES_FILE,
            r#"
welcome:
  subject: "Hello"
  content: "Welcome aboard"
"#,
        );

        let store = FileWorkflowStore::load(dir.path()).unwrap();
        assert_eq!(store.len(), 1);

        let definition = store.get_workflow("digest").await.unwrap();
        assert!(definition.is_some());
        assert!(store.get_workflow("missing").await.unwrap().is_none());

        let template = WorkflowStore::get_notification_template(&store, "welcome")
            .await
            .unwrap();
        assert_eq!(template.unwrap().subject, "Hello");
    }

    #[tokio::test]
    async fn test_invalid_definition_rejected_at_load() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "broken.yaml",
            r#"
id: broken
steps:
  - id: a
    type: condition
    config:
      conditions: []
    dependencies: [a]
"#,
        );

        let result = FileWorkflowStore::load(dir.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_unrelated_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "README.md", "not a workflow");

        let store = FileWorkflowStore::load(dir.path()).unwrap();
        assert!(store.is_empty());
    }
}
