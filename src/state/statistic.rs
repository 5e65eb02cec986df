//! Statistic-specific state operations

use super::entity::EntityState;
use crate::error::HookError;
use crate::models::{Statistic, Task};
use crate::services::EntityService;
use crate::views::daily_snapshot;
use chrono::Utc;

impl<S> EntityState<S>
where
    S: EntityService<Entity = Statistic>,
{
    /// Store a snapshot of today's tasks as a new statistic.
    pub async fn record_daily(&self, tasks: &[Task]) -> Result<Statistic, HookError> {
        self.add(&daily_snapshot(tasks, Utc::now())).await
    }
}
