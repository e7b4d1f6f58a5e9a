//! Exam-prep checklist helpers.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::ChecklistItem;

/// Completion summary for a checklist.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChecklistProgress {
    pub completed: usize,
    pub total: usize,
    pub percent: f64,
}

impl ChecklistProgress {
    pub fn of(items: &[ChecklistItem]) -> Self {
        let completed = items.iter().filter(|item| item.completed).count();
        let total = items.len();
        let percent = if total > 0 {
            completed as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        Self {
            completed,
            total,
            percent,
        }
    }
}

/// An incomplete item whose deadline has already passed.
pub fn is_overdue(item: &ChecklistItem, today: NaiveDate) -> bool {
    !item.completed && item.deadline.is_some_and(|deadline| deadline < today)
}

/// Items in display order.
pub fn sorted_by_order(items: &[ChecklistItem]) -> Vec<ChecklistItem> {
    let mut sorted = items.to_vec();
    sorted.sort_by_key(|item| (item.order, item.id));
    sorted
}

/// Replace a local item with the server's copy after a completion call.
pub fn apply_update(items: &mut [ChecklistItem], updated: ChecklistItem) -> bool {
    match items.iter_mut().find(|item| item.id == updated.id) {
        Some(slot) => {
            *slot = updated;
            true
        }
        None => {
            log::debug!("checklist item {} not in local list", updated.id);
            false
        }
    }
}
