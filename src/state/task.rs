//! Task-specific state operations

use super::entity::EntityState;
use crate::error::{Action, HookError, StoreError};
use crate::models::{Task, TaskPatch};
use crate::services::EntityService;
use chrono::Utc;

impl<S> EntityState<S>
where
    S: EntityService<Entity = Task>,
{
    /// Flip `completed` on a cached task, stamping or clearing
    /// `completed_at`, and send the whole merged task as the update.
    pub async fn toggle_complete(&self, id: i64) -> Result<Task, HookError> {
        let Some(current) = self.get(id).await else {
            return Err(HookError::new(
                Action::Update,
                "task",
                StoreError::NotFound { entity: "task", id },
            ));
        };

        let completed = !current.completed;
        let mut patch = TaskPatch::full(&current);
        patch.completed = Some(completed);
        patch.completed_at = Some(completed.then(Utc::now));

        let updated = self.apply_update(id, &patch).await?;
        self.notify_success(if updated.completed {
            "Task completed"
        } else {
            "Task marked as pending"
        });
        Ok(updated)
    }
}
