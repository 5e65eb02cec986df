//! Productivity metrics over the cached task list
//!
//! Calendar days are UTC dates of `created_at`.

use crate::models::{NewStatistic, Task};
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Minutes credited per completed task in a daily snapshot.
pub const MINUTES_PER_COMPLETED_TASK: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    #[default]
    Week,
    Month,
    Year,
}

impl TimeRange {
    pub fn days(&self) -> i64 {
        match self {
            TimeRange::Week => 7,
            TimeRange::Month => 30,
            TimeRange::Year => 365,
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TimeRange::Week => "week",
            TimeRange::Month => "month",
            TimeRange::Year => "year",
        };
        f.write_str(s)
    }
}

impl FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "week" => Ok(TimeRange::Week),
            "month" => Ok(TimeRange::Month),
            "year" => Ok(TimeRange::Year),
            other => Err(format!("unknown time range: {other} (expected week, month or year)")),
        }
    }
}

/// Rounded percentage `part / whole × 100`, 0 when `whole` is 0.
fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskMetrics {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub pending_tasks: usize,
    /// Rounded percentage, 0 when there are no tasks
    pub completion_rate: u32,
    /// `min(100, round(completed × 10 + rate × 0.5))`
    pub productivity_score: u32,
    /// Tasks created within the range
    pub recent_tasks: usize,
    pub recent_completed: usize,
    pub average_daily_tasks: u32,
}

impl TaskMetrics {
    pub fn compute(tasks: &[Task], range: TimeRange, now: DateTime<Utc>) -> Self {
        let total = tasks.len();
        let completed = tasks.iter().filter(|t| t.completed).count();
        let rate = percent(completed, total);
        let score = (completed as f64 * 10.0 + rate * 0.5).round().min(100.0);

        let cutoff = now - Duration::days(range.days());
        let recent: Vec<&Task> = tasks.iter().filter(|t| t.created_at > cutoff).collect();
        let recent_completed = recent.iter().filter(|t| t.completed).count();

        Self {
            total_tasks: total,
            completed_tasks: completed,
            pending_tasks: total - completed,
            completion_rate: rate.round() as u32,
            productivity_score: score as u32,
            recent_tasks: recent.len(),
            recent_completed,
            average_daily_tasks: (recent.len() as f64 / range.days() as f64).round() as u32,
        }
    }
}

/// Tasks created on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyBucket {
    pub date: NaiveDate,
    /// `Mon` for week ranges, `Mar 9` otherwise
    pub label: String,
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    /// Completed share of the day, rounded percentage
    pub score: u32,
}

/// Days covered by `range`, oldest first.
///
/// A week is Sunday through Saturday of the current week; month and year
/// are the trailing 30 / 365 days ending today.
pub fn range_days(range: TimeRange, today: NaiveDate) -> Vec<NaiveDate> {
    let start = match range {
        TimeRange::Week => {
            today - Duration::days(i64::from(today.weekday().num_days_from_sunday()))
        }
        TimeRange::Month | TimeRange::Year => today - Duration::days(range.days() - 1),
    };
    (0..range.days()).map(|i| start + Duration::days(i)).collect()
}

/// Per-day created/completed counts over `range`.
pub fn daily_breakdown(tasks: &[Task], range: TimeRange, now: DateTime<Utc>) -> Vec<DailyBucket> {
    let mut by_day: HashMap<NaiveDate, (usize, usize)> = HashMap::new();
    for task in tasks {
        let entry = by_day.entry(task.created_at.date_naive()).or_default();
        entry.0 += 1;
        if task.completed {
            entry.1 += 1;
        }
    }

    let label_format = match range {
        TimeRange::Week => "%a",
        TimeRange::Month | TimeRange::Year => "%b %-d",
    };

    range_days(range, now.date_naive())
        .into_iter()
        .map(|date| {
            let (total, completed) = by_day.get(&date).copied().unwrap_or_default();
            DailyBucket {
                date,
                label: date.format(label_format).to_string(),
                total,
                completed,
                pending: total - completed,
                score: percent(completed, total).round() as u32,
            }
        })
        .collect()
}

/// Statistic record summarizing tasks created today.
pub fn daily_snapshot(tasks: &[Task], now: DateTime<Utc>) -> NewStatistic {
    let today = now.date_naive();
    let todays: Vec<&Task> = tasks
        .iter()
        .filter(|t| t.created_at.date_naive() == today)
        .collect();
    let completed = todays.iter().filter(|t| t.completed).count();

    NewStatistic {
        name: Some(format!("Daily Stats - {}", today.format("%b %-d, %Y"))),
        productivity_score: percent(completed, todays.len()).round() as i64,
        tasks_completed: completed as i64,
        time_spent: completed as i64 * MINUTES_PER_COMPLETED_TASK,
        date: Some(today),
        user_id: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn task(created_at: DateTime<Utc>, completed: bool) -> Task {
        Task {
            id: 0,
            title: "t".into(),
            completed,
            category_id: None,
            priority: Priority::Medium,
            due_date: None,
            notes: None,
            created_at,
            completed_at: None,
        }
    }

    #[test]
    fn test_time_range_parse() {
        assert_eq!("Month".parse::<TimeRange>().unwrap(), TimeRange::Month);
        assert_eq!(TimeRange::Year.days(), 365);
        assert!("decade".parse::<TimeRange>().is_err());
    }

    #[test]
    fn test_empty_metrics() {
        let m = TaskMetrics::compute(&[], TimeRange::Week, at(2024, 3, 9));
        assert_eq!(m.completion_rate, 0);
        assert_eq!(m.productivity_score, 0);
        assert_eq!(m.average_daily_tasks, 0);
    }

    #[test]
    fn test_score_is_capped() {
        let now = at(2024, 3, 9);
        let tasks: Vec<Task> = (0..12).map(|_| task(now, true)).collect();
        let m = TaskMetrics::compute(&tasks, TimeRange::Week, now);
        assert_eq!(m.completion_rate, 100);
        assert_eq!(m.productivity_score, 100);
    }

    #[test]
    fn test_recent_window() {
        let now = at(2024, 3, 9);
        let tasks = vec![
            task(at(2024, 3, 8), true),
            task(at(2024, 2, 1), true),
            task(at(2024, 3, 5), false),
        ];
        let m = TaskMetrics::compute(&tasks, TimeRange::Week, now);
        assert_eq!(m.recent_tasks, 2);
        assert_eq!(m.recent_completed, 1);
        assert_eq!(m.average_daily_tasks, 0);
    }

    #[test]
    fn test_week_runs_sunday_to_saturday() {
        // 2024-03-13 is a Wednesday
        let days = range_days(TimeRange::Week, "2024-03-13".parse().unwrap());
        assert_eq!(days.len(), 7);
        assert_eq!(days[0].to_string(), "2024-03-10");
        assert_eq!(days[6].to_string(), "2024-03-16");
    }

    #[test]
    fn test_month_is_trailing_days() {
        let days = range_days(TimeRange::Month, "2024-03-09".parse().unwrap());
        assert_eq!(days.len(), 30);
        assert_eq!(days[0].to_string(), "2024-02-09");
        assert_eq!(days[29].to_string(), "2024-03-09");
    }

    #[test]
    fn test_breakdown_buckets_and_labels() {
        let now = at(2024, 3, 13);
        let tasks = vec![
            task(at(2024, 3, 11), true),
            task(at(2024, 3, 11), false),
            task(at(2024, 3, 12), false),
            task(at(2024, 3, 1), true),
        ];
        let week = daily_breakdown(&tasks, TimeRange::Week, now);
        assert_eq!(week[0].label, "Sun");
        let monday = &week[1];
        assert_eq!(monday.label, "Mon");
        assert_eq!((monday.total, monday.completed, monday.pending), (2, 1, 1));
        assert_eq!(monday.score, 50);
        assert_eq!(week.iter().map(|b| b.total).sum::<usize>(), 3);

        let month = daily_breakdown(&tasks, TimeRange::Month, now);
        assert_eq!(month.last().unwrap().label, "Mar 13");
        assert_eq!(month.iter().map(|b| b.total).sum::<usize>(), 4);
    }

    #[test]
    fn test_daily_snapshot() {
        let now = at(2024, 3, 9);
        let tasks = vec![
            task(now, true),
            task(now, false),
            task(now, true),
            task(at(2024, 3, 8), true),
        ];
        let snap = daily_snapshot(&tasks, now);
        assert_eq!(snap.name.as_deref(), Some("Daily Stats - Mar 9, 2024"));
        assert_eq!(snap.tasks_completed, 2);
        assert_eq!(snap.productivity_score, 67);
        assert_eq!(snap.time_spent, 60);
        assert_eq!(snap.date, Some(now.date_naive()));
    }
}
