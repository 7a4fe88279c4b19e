//! Drag-and-drop reordering within a category.
//!
//! List order is derived from due dates, so a move is persisted by rewriting
//! the due dates of the category to consecutive days.

use chrono::NaiveDate;
use futures::future::join_all;
use serde::{Serialize, Deserialize};
use crate::calendar::add_days;
use crate::error::GaiaError;
use crate::todo::model::{order_category, Category, Task};
use crate::todo::store::TaskStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropPosition {
    Before,
    After,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueDateChange {
    pub task_id: String,
    pub from: Option<NaiveDate>,
    pub to: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderPlan {
    /// Task ids in their new order.
    pub order: Vec<String>,
    /// Only tasks whose due date actually moves.
    pub changes: Vec<DueDateChange>,
}

/// Compute the new order and due dates for moving `task_id` next to `target_id`.
///
/// `ordered` must already be in list order. A missing or unknown target sends
/// the task to the end. The first task of the new order lands on the earliest
/// due date the list had before the move, or tomorrow when nothing was dated;
/// each following task gets the next day. Returns `None` when `task_id` is not
/// in the list.
pub fn plan_reorder(
    ordered: &[Task],
    task_id: &str,
    target_id: Option<&str>,
    position: DropPosition,
    today: NaiveDate,
) -> Option<ReorderPlan> {
    let from = ordered.iter().position(|t| t.id == task_id)?;
    let anchor = ordered
        .iter()
        .find_map(|t| t.due_date)
        .unwrap_or_else(|| add_days(today, 1));

    let mut next: Vec<&Task> = ordered.iter().collect();
    let moved = next.remove(from);

    let insert_at = target_id
        .filter(|target| *target != task_id)
        .and_then(|target| next.iter().position(|t| t.id == target))
        .map(|idx| match position {
            DropPosition::Before => idx,
            DropPosition::After => idx + 1,
        })
        .unwrap_or(next.len());
    next.insert(insert_at, moved);

    let mut changes = Vec::new();
    for (offset, task) in next.iter().enumerate() {
        let due = add_days(anchor, offset as i64);
        if task.due_date != Some(due) {
            changes.push(DueDateChange { task_id: task.id.clone(), from: task.due_date, to: due });
        }
    }

    Some(ReorderPlan {
        order: next.into_iter().map(|t| t.id.clone()).collect(),
        changes,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum WriteOutcome {
    Ok,
    Failed { reason: String },
}

/// Result of one due-date write issued by [`reorder`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderOutcome {
    pub task_id: String,
    pub due_date: NaiveDate,
    pub outcome: WriteOutcome,
}

impl ReorderOutcome {
    pub fn is_ok(&self) -> bool {
        self.outcome == WriteOutcome::Ok
    }
}

/// Move a task and persist the resulting due dates.
///
/// Writes are issued concurrently and are not transactional: each task's
/// outcome is reported on its own, and earlier successes stay in place when a
/// later write fails. Only a failure to list the category is an error.
pub async fn reorder<S: TaskStore + ?Sized>(
    store: &S,
    category: Category,
    task_id: &str,
    target_id: Option<&str>,
    position: DropPosition,
    today: NaiveDate,
) -> Result<Vec<ReorderOutcome>, GaiaError> {
    let tasks = store.list().await?;
    let ordered = order_category(&tasks, category);

    let Some(plan) = plan_reorder(&ordered, task_id, target_id, position, today) else {
        tracing::warn!(task_id, category = ?category, "Reorder requested for a task not in the category");
        return Ok(Vec::new());
    };

    let writes = plan.changes.iter().map(|change| async move {
        let outcome = match store.update_due_date(&change.task_id, Some(change.to)).await {
            Ok(()) => WriteOutcome::Ok,
            Err(e) => {
                tracing::warn!(task_id = %change.task_id, error = %e, "Due date write failed during reorder");
                WriteOutcome::Failed { reason: e.to_string() }
            }
        };
        ReorderOutcome { task_id: change.task_id.clone(), due_date: change.to, outcome }
    });
    let outcomes = join_all(writes).await;

    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
    tracing::info!(
        category = ?category,
        task_id,
        writes = outcomes.len(),
        failed,
        "Reordered tasks"
    );
    Ok(outcomes)
}
