//! Daily todo tasks: list ordering, status, and drag-and-drop resequencing.

pub mod model;
pub mod reorder;
pub mod store;

pub use model::{count_tasks, order_category, Category, StatusTone, Task, TaskCounts, TaskStatus};
pub use reorder::{plan_reorder, reorder, DropPosition, DueDateChange, ReorderOutcome, ReorderPlan, WriteOutcome};
pub use store::{set_task_status, StorageTaskStore, TaskStore};
