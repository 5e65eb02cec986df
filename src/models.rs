//! Entity models, create inputs and sparse patches
//!
//! Entities serialize with their UI field names (`categoryId`, `createdAt`,
//! ...). The matching backend columns live in each entity's static
//! [`Schema`]; nothing else in the crate knows the backend names.

use crate::records::fields::{FieldDefault, FieldSpec, Schema};
use crate::records::wire::SortType;
use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default category color.
pub const DEFAULT_CATEGORY_COLOR: &str = "#5B46F0";

/// A record type managed through the record store.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Input accepted by `create`
    type Create: Serialize + Send + Sync;
    /// Sparse input accepted by `update`; `None` fields are not sent
    type Patch: Serialize + Send + Sync;

    /// Field map and table description
    const SCHEMA: &'static Schema;

    fn id(&self) -> i64;
}

// ============================================================================
// Priority
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(format!("unknown priority: {other}")),
        }
    }
}

// ============================================================================
// Task
// ============================================================================

/// A unit of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub completed: bool,
    pub category_id: Option<i64>,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    /// Markdown body
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Set when `completed` flips to true, cleared when it flips back
    pub completed_at: Option<DateTime<Utc>>,
}

/// Input for creating a task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl NewTask {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }
}

/// Sparse task update. `Some(None)` clears a nullable field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Option<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<NaiveDate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Option<DateTime<Utc>>>,
}

impl TaskPatch {
    /// A patch carrying every mutable field of `task`.
    pub fn full(task: &Task) -> Self {
        Self {
            title: Some(task.title.clone()),
            completed: Some(task.completed),
            category_id: Some(task.category_id),
            priority: Some(task.priority),
            due_date: Some(task.due_date),
            notes: Some(task.notes.clone()),
            completed_at: Some(task.completed_at),
        }
    }
}

const TASK_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("title", "Name", FieldDefault::Text("")),
    FieldSpec::new("completed", "completed", FieldDefault::Bool(false)),
    FieldSpec::new("categoryId", "categoryId", FieldDefault::Null),
    FieldSpec::new("priority", "priority", FieldDefault::Text("medium")),
    FieldSpec::new("dueDate", "dueDate", FieldDefault::Null),
    FieldSpec::new("notes", "notes", FieldDefault::Null),
    FieldSpec::new("createdAt", "CreatedOn", FieldDefault::Now),
    FieldSpec::new("completedAt", "completedAt", FieldDefault::Null),
];

pub const TASK_SCHEMA: Schema = Schema {
    table: "task",
    label: "task",
    plural: "tasks",
    fields: TASK_FIELDS,
    order_by: ("CreatedOn", SortType::Desc),
};

impl Entity for Task {
    type Create = NewTask;
    type Patch = TaskPatch;
    const SCHEMA: &'static Schema = &TASK_SCHEMA;

    fn id(&self) -> i64 {
        self.id
    }
}

// ============================================================================
// Category
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    /// Hex color, e.g. `#5B46F0`
    pub color: String,
    /// Informational only; live counts come from `views::category_task_counts`
    pub task_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_count: Option<i64>,
}

const CATEGORY_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("name", "Name", FieldDefault::Text("")),
    FieldSpec::new("color", "color", FieldDefault::Text(DEFAULT_CATEGORY_COLOR)),
    FieldSpec::new("taskCount", "taskCount", FieldDefault::Int(0)),
    FieldSpec::new("createdAt", "CreatedOn", FieldDefault::Now),
];

pub const CATEGORY_SCHEMA: Schema = Schema {
    table: "category",
    label: "category",
    plural: "categories",
    fields: CATEGORY_FIELDS,
    order_by: ("CreatedOn", SortType::Asc),
};

impl Entity for Category {
    type Create = NewCategory;
    type Patch = CategoryPatch;
    const SCHEMA: &'static Schema = &CATEGORY_SCHEMA;

    fn id(&self) -> i64 {
        self.id
    }
}

// ============================================================================
// Subtask
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subtask {
    pub id: i64,
    pub name: String,
    pub completed: bool,
    /// Owning task; tolerated as absent when the backend has no value
    pub task_id: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubtask {
    pub name: String,
    pub task_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<i64>,
}

const SUBTASK_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("name", "Name", FieldDefault::Text("")),
    FieldSpec::new("completed", "completed", FieldDefault::Bool(false)),
    FieldSpec::new("taskId", "taskId", FieldDefault::Null),
];

pub const SUBTASK_SCHEMA: Schema = Schema {
    table: "subtask",
    label: "subtask",
    plural: "subtasks",
    fields: SUBTASK_FIELDS,
    order_by: ("Id", SortType::Asc),
};

impl Entity for Subtask {
    type Create = NewSubtask;
    type Patch = SubtaskPatch;
    const SCHEMA: &'static Schema = &SUBTASK_SCHEMA;

    fn id(&self) -> i64 {
        self.id
    }
}

// ============================================================================
// Statistic
// ============================================================================

/// A stored productivity snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistic {
    pub id: i64,
    pub name: String,
    /// 0–100
    pub productivity_score: i64,
    pub tasks_completed: i64,
    /// Minutes
    pub time_spent: i64,
    pub date: NaiveDate,
    pub user_id: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStatistic {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub productivity_score: i64,
    pub tasks_completed: i64,
    pub time_spent: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub productivity_score: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks_completed: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_spent: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Option<i64>>,
}

const STATISTIC_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("name", "Name", FieldDefault::DatedLabel("Statistics")),
    FieldSpec::new("productivityScore", "productivityScore", FieldDefault::Int(0)),
    FieldSpec::new("tasksCompleted", "tasksCompleted", FieldDefault::Int(0)),
    FieldSpec::new("timeSpent", "timeSpent", FieldDefault::Int(0)),
    FieldSpec::new("date", "date", FieldDefault::Today),
    FieldSpec::new("userId", "userId", FieldDefault::Null),
];

pub const STATISTIC_SCHEMA: Schema = Schema {
    table: "statistic",
    label: "statistic",
    plural: "statistics",
    fields: STATISTIC_FIELDS,
    order_by: ("date", SortType::Desc),
};

impl Entity for Statistic {
    type Create = NewStatistic;
    type Patch = StatisticPatch;
    const SCHEMA: &'static Schema = &STATISTIC_SCHEMA;

    fn id(&self) -> i64 {
        self.id
    }
}
