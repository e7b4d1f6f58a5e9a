//! Daily schedule helpers.

use chrono::{Duration, NaiveDate};

use crate::errors::{ModelError, ModelResult};
use crate::models::{Task, TaskType};

/// Date format used by the tasks endpoint.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(raw: &str) -> ModelResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| ModelError::InvalidDate(raw.trim().to_string()))
}

/// Format a date the way the tasks endpoint expects it.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Move a date forwards or backwards by whole days.
pub fn shift_date(date: NaiveDate, days: i64) -> NaiveDate {
    date.checked_add_signed(Duration::days(days)).unwrap_or(date)
}

/// Points earned on a day: completed tasks only, penalties included.
pub fn earned_points(tasks: &[Task]) -> i64 {
    tasks
        .iter()
        .filter(|task| task.completed)
        .map(|task| task.task_type.points)
        .sum()
}

/// Number of completed tasks.
pub fn completed_count(tasks: &[Task]) -> usize {
    tasks.iter().filter(|task| task.completed).count()
}

/// Task types grouped by category, groups in first-appearance order.
pub fn group_by_category(task_types: &[TaskType]) -> Vec<(String, Vec<TaskType>)> {
    let mut groups: Vec<(String, Vec<TaskType>)> = Vec::new();
    for task_type in task_types {
        match groups.iter_mut().find(|(category, _)| *category == task_type.category) {
            Some((_, members)) => members.push(task_type.clone()),
            None => groups.push((task_type.category.clone(), vec![task_type.clone()])),
        }
    }
    groups
}

/// Signed point figure, e.g. `+10pt` or `-5pt`.
pub fn format_points(points: i64) -> String {
    if points >= 0 {
        format!("+{points}pt")
    } else {
        format!("{points}pt")
    }
}

/// Local task list after a create/complete/delete call succeeded.
///
/// The server response always wins over what the list held before.
#[derive(Debug, Clone, Default)]
pub struct DayTasks {
    pub date: Option<NaiveDate>,
    pub tasks: Vec<Task>,
}

impl DayTasks {
    pub fn new(date: NaiveDate, tasks: Vec<Task>) -> Self {
        Self {
            date: Some(date),
            tasks,
        }
    }

    /// Append a freshly created task if it belongs to this day.
    pub fn push_created(&mut self, task: Task) {
        if self.date.is_none_or(|date| date == task.date) {
            self.tasks.push(task);
        }
    }

    /// Replace a task with the server's copy.
    pub fn replace(&mut self, task: Task) {
        if let Some(slot) = self.tasks.iter_mut().find(|t| t.id == task.id) {
            *slot = task;
        }
    }

    /// Drop a deleted task.
    pub fn remove(&mut self, task_id: i64) {
        self.tasks.retain(|task| task.id != task_id);
    }

    pub fn earned_points(&self) -> i64 {
        earned_points(&self.tasks)
    }
}
