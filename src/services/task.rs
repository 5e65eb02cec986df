//! Task service

use super::traits::EntityService;
use super::require_text;
use crate::error::StoreError;
use crate::models::{Entity, NewTask, Subtask, Task, TaskPatch};
use crate::notify::Notifier;
use crate::records::{RecordBackend, RecordStore, WhereClause};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

const TITLE_REQUIRED: &str = "Task title is required";

/// CRUD for tasks. Deleting a task also deletes its subtasks.
#[derive(Clone, Debug)]
pub struct TaskService {
    tasks: RecordStore<Task>,
    subtasks: RecordStore<Subtask>,
}

impl TaskService {
    pub fn new(backend: Arc<dyn RecordBackend>, notifier: Option<Arc<dyn Notifier>>) -> Self {
        Self {
            tasks: RecordStore::new(backend.clone(), notifier.clone()),
            subtasks: RecordStore::new(backend, notifier),
        }
    }

    /// Remove every subtask owned by `task_id`. Failures are logged and
    /// reported; they never undo the task deletion.
    async fn cascade_subtasks(&self, task_id: i64) {
        let task_key = Subtask::SCHEMA.backend_name("taskId").unwrap_or("taskId");
        let owned = match self
            .subtasks
            .try_find_where(vec![WhereClause::equal_to(task_key, task_id)])
            .await
        {
            Ok(owned) => owned,
            Err(e) => {
                warn!(task_id, error = %e, "could not list subtasks for cascade delete");
                if let Some(n) = self.tasks.notifier() {
                    n.error("Failed to remove subtasks of deleted task");
                }
                return;
            }
        };
        let ids: Vec<i64> = owned.iter().map(|s| s.id).collect();
        match self.subtasks.delete_many(&ids).await {
            Ok(removed) if removed == ids.len() => {
                if removed > 0 {
                    info!(task_id, removed, "cascade-deleted subtasks");
                }
            }
            Ok(removed) => {
                warn!(task_id, removed, expected = ids.len(), "cascade delete incomplete");
            }
            Err(e) => {
                warn!(task_id, error = %e, "cascade delete failed");
            }
        }
    }
}

#[async_trait]
impl EntityService for TaskService {
    type Entity = Task;

    async fn get_all(&self) -> Vec<Task> {
        self.tasks.get_all().await
    }

    async fn try_get_all(&self) -> Result<Vec<Task>, StoreError> {
        self.tasks.try_get_all().await
    }

    async fn get_by_id(&self, id: i64) -> Option<Task> {
        self.tasks.get_by_id(id).await
    }

    async fn create(&self, input: &NewTask) -> Result<Task, StoreError> {
        require_text(self.tasks.notifier(), "title", &input.title, TITLE_REQUIRED)?;
        self.tasks.create(input).await
    }

    async fn update(&self, id: i64, patch: &TaskPatch) -> Result<Task, StoreError> {
        if let Some(ref title) = patch.title {
            require_text(self.tasks.notifier(), "title", title, TITLE_REQUIRED)?;
        }
        self.tasks.update(id, patch).await
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let deleted = self.tasks.delete(id).await?;
        if deleted {
            self.cascade_subtasks(id).await;
        }
        Ok(deleted)
    }
}
