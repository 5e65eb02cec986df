//! Subtask service

use super::traits::EntityService;
use crate::error::StoreError;
use crate::models::{Entity, NewSubtask, Subtask, SubtaskPatch};
use crate::notify::Notifier;
use crate::records::{RecordBackend, RecordStore, WhereClause};
use async_trait::async_trait;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct SubtaskService {
    store: RecordStore<Subtask>,
}

impl SubtaskService {
    pub fn new(backend: Arc<dyn RecordBackend>, notifier: Option<Arc<dyn Notifier>>) -> Self {
        Self {
            store: RecordStore::new(backend, notifier),
        }
    }

    /// Subtasks owned by `task_id`, oldest first. Degrades to empty.
    pub async fn get_by_task_id(&self, task_id: i64) -> Vec<Subtask> {
        let key = Subtask::SCHEMA.backend_name("taskId").unwrap_or("taskId");
        self.store
            .find_where(vec![WhereClause::equal_to(key, task_id)])
            .await
    }
}

#[async_trait]
impl EntityService for SubtaskService {
    type Entity = Subtask;

    async fn get_all(&self) -> Vec<Subtask> {
        self.store.get_all().await
    }

    async fn try_get_all(&self) -> Result<Vec<Subtask>, StoreError> {
        self.store.try_get_all().await
    }

    async fn get_by_id(&self, id: i64) -> Option<Subtask> {
        self.store.get_by_id(id).await
    }

    async fn create(&self, input: &NewSubtask) -> Result<Subtask, StoreError> {
        self.store.create(input).await
    }

    async fn update(&self, id: i64, patch: &SubtaskPatch) -> Result<Subtask, StoreError> {
        self.store.update(id, patch).await
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        self.store.delete(id).await
    }
}
