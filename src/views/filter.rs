//! Task filtering and category helpers
//!
//! Everything here is a pure function of the cached lists; nothing is
//! memoized.

use crate::models::{Category, Priority, Task};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Active filter criteria for a task list. Empty criteria match anything;
/// all active criteria must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Case-insensitive substring of the title
    pub search_query: String,
    pub priority: Option<Priority>,
    pub category: Option<i64>,
    /// Category selected outside the filter bar (e.g. a sidebar); applies
    /// on top of `category` and survives [`clear`](Self::clear)
    pub scope: Option<i64>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(scope) = self.scope {
            if task.category_id != Some(scope) {
                return false;
            }
        }
        if let Some(category) = self.category {
            if task.category_id != Some(category) {
                return false;
            }
        }
        if !self.search_query.is_empty()
            && !task
                .title
                .to_lowercase()
                .contains(&self.search_query.to_lowercase())
        {
            return false;
        }
        if let Some(priority) = self.priority {
            if task.priority != priority {
                return false;
            }
        }
        true
    }

    /// Tasks passing the filter, in input order.
    pub fn apply(&self, tasks: &[Task]) -> Vec<Task> {
        tasks.iter().filter(|t| self.matches(t)).cloned().collect()
    }

    /// Reset search, priority and category. The scope is kept.
    pub fn clear(&mut self) {
        self.search_query.clear();
        self.priority = None;
        self.category = None;
    }

    /// Whether any filter-bar criterion is set.
    pub fn is_active(&self) -> bool {
        !self.search_query.is_empty() || self.priority.is_some() || self.category.is_some()
    }
}

/// Number of tasks per category id. Uncategorized tasks are not counted.
pub fn category_task_counts(tasks: &[Task]) -> HashMap<i64, usize> {
    let mut counts = HashMap::new();
    for id in tasks.iter().filter_map(|t| t.category_id) {
        *counts.entry(id).or_insert(0) += 1;
    }
    counts
}

pub fn task_count(tasks: &[Task], category_id: i64) -> usize {
    tasks
        .iter()
        .filter(|t| t.category_id == Some(category_id))
        .count()
}

/// Name of the referenced category; `None` for dangling references.
pub fn category_name(categories: &[Category], category_id: Option<i64>) -> Option<&str> {
    let id = category_id?;
    categories
        .iter()
        .find(|c| c.id == id)
        .map(|c| c.name.as_str())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueStatus {
    Today,
    Overdue,
    Upcoming,
}

/// Due-date status relative to `today`; `None` when the task has no due date.
pub fn due_status(task: &Task, today: NaiveDate) -> Option<DueStatus> {
    let due = task.due_date?;
    Some(match due.cmp(&today) {
        std::cmp::Ordering::Equal => DueStatus::Today,
        std::cmp::Ordering::Less => DueStatus::Overdue,
        std::cmp::Ordering::Greater => DueStatus::Upcoming,
    })
}
