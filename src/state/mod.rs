//! Client-side state containers
//!
//! One [`EntityState`] per entity type holds the cached list, a loading
//! flag and the last load error. Entity-specific helpers (task completion
//! toggling, subtasks by task, daily statistics) live in impl blocks
//! specialized on the service type.

pub mod entity;
pub mod statistic;
pub mod subtask;
pub mod task;

pub use entity::{EntityState, Snapshot};

use crate::services::{CategoryService, StatisticService, SubtaskService, TaskService};

pub type TaskState = EntityState<TaskService>;
pub type CategoryState = EntityState<CategoryService>;
pub type SubtaskState = EntityState<SubtaskService>;
pub type StatisticState = EntityState<StatisticService>;
