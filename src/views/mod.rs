//! Derived views computed from cached entity lists

pub mod filter;
pub mod stats;

pub use filter::{category_name, category_task_counts, due_status, task_count, DueStatus, TaskFilter};
pub use stats::{daily_breakdown, daily_snapshot, DailyBucket, TaskMetrics, TimeRange};
