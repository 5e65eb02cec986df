//! Subtask-specific state operations

use super::entity::EntityState;
use crate::models::Subtask;
use crate::services::EntityService;

impl<S> EntityState<S>
where
    S: EntityService<Entity = Subtask>,
{
    /// Cached subtasks owned by `task_id`, in cache order.
    pub async fn for_task(&self, task_id: i64) -> Vec<Subtask> {
        self.items()
            .await
            .into_iter()
            .filter(|s| s.task_id == Some(task_id))
            .collect()
    }

    /// `(completed, total)` for the subtasks of `task_id`.
    pub async fn progress(&self, task_id: i64) -> (usize, usize) {
        let owned = self.for_task(task_id).await;
        (owned.iter().filter(|s| s.completed).count(), owned.len())
    }
}
