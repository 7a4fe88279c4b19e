use std::cmp::Ordering;
use std::collections::BTreeMap;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Serialize, Deserialize};
use crate::calendar::days_between;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Life,
    Work,
    Distraction,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Life, Category::Work, Category::Distraction];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Life => "Life",
            Category::Work => "Work",
            Category::Distraction => "Distraction",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Done,
    Skipped,
}

/// Display state of a task, derived from its newest status entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusTone {
    Pending,
    Done,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub category: Category,
    pub title: String,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub status_by_date: BTreeMap<NaiveDate, TaskStatus>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat: Option<String>,
}

impl Task {
    pub fn new<S: Into<String>>(id: S, category: Category, title: S, created_at: DateTime<Utc>) -> Self {
        Task {
            id: id.into(),
            category,
            title: title.into(),
            due_date: None,
            status_by_date: BTreeMap::new(),
            created_at,
            note: None,
            repeat: None,
        }
    }

    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn status_on(&self, date: NaiveDate) -> Option<TaskStatus> {
        self.status_by_date.get(&date).copied()
    }

    /// Set or clear the status for `date`.
    pub fn set_status(&mut self, date: NaiveDate, status: Option<TaskStatus>) {
        match status {
            Some(status) => {
                self.status_by_date.insert(date, status);
            }
            None => {
                self.status_by_date.remove(&date);
            }
        }
    }

    /// The date a status change applies to: the due date, or today when unscheduled.
    pub fn status_date(&self, today: NaiveDate) -> NaiveDate {
        self.due_date.unwrap_or(today)
    }

    /// Tone of the newest status entry; pending when there is none.
    pub fn resolve_status(&self) -> StatusTone {
        match self.status_by_date.values().next_back() {
            Some(TaskStatus::Done) => StatusTone::Done,
            Some(TaskStatus::Skipped) => StatusTone::Skipped,
            None => StatusTone::Pending,
        }
    }

    fn is_closed_on(&self, date: NaiveDate) -> bool {
        self.status_on(date).is_some()
    }
}

/// Due date ascending, undated last, newest first among equals.
fn compare_for_list(a: &Task, b: &Task) -> Ordering {
    match (a.due_date, b.due_date) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| b.created_at.cmp(&a.created_at))
}

/// The tasks of one category in list order.
pub fn order_category(tasks: &[Task], category: Category) -> Vec<Task> {
    let mut list: Vec<Task> = tasks.iter().filter(|t| t.category == category).cloned().collect();
    list.sort_by(compare_for_list);
    list
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaskCounts {
    /// Open tasks due today.
    pub today_pending: usize,
    /// Open tasks due within the next seven days, today included.
    pub next_seven: usize,
    pub all_pending: usize,
    /// Tasks marked done today, out of `total`.
    pub done_today: usize,
    pub total: usize,
}

pub fn count_tasks(tasks: &[Task], today: NaiveDate) -> TaskCounts {
    let mut counts = TaskCounts { total: tasks.len(), ..TaskCounts::default() };
    for task in tasks {
        if task.status_on(today) == Some(TaskStatus::Done) {
            counts.done_today += 1;
        }
        if task.is_closed_on(today) {
            continue;
        }
        counts.all_pending += 1;
        if let Some(due) = task.due_date {
            let diff = days_between(today, due);
            if diff == 0 {
                counts.today_pending += 1;
            }
            if (0..=6).contains(&diff) {
                counts.next_seven += 1;
            }
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn task(id: &str, due: Option<NaiveDate>, created_hour: u32) -> Task {
        let created = Utc.with_ymd_and_hms(2025, 11, 30, created_hour, 0, 0).unwrap();
        let mut t = Task::new(id, Category::Work, id, created);
        t.due_date = due;
        t
    }

    #[test]
    fn test_order_puts_undated_last_and_newest_first() {
        let tasks = vec![
            task("undated", None, 1),
            task("late", Some(d(2025, 12, 9)), 1),
            task("early-old", Some(d(2025, 12, 5)), 1),
            task("early-new", Some(d(2025, 12, 5)), 5),
        ];
        let ids: Vec<String> = order_category(&tasks, Category::Work).into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["early-new", "early-old", "late", "undated"]);
        assert!(order_category(&tasks, Category::Life).is_empty());
    }

    #[test]
    fn test_categories_partition_tasks() {
        let mut tasks = vec![task("w", None, 1)];
        tasks.push(Task::new("l", Category::Life, "l", tasks[0].created_at));
        let listed: usize = Category::ALL.iter().map(|c| order_category(&tasks, *c).len()).sum();
        assert_eq!(listed, tasks.len());
        let labels: Vec<&str> = Category::ALL.iter().map(|c| c.label()).collect();
        assert_eq!(labels, vec!["Life", "Work", "Distraction"]);
    }

    #[test]
    fn test_resolve_status_uses_latest_entry() {
        let mut t = task("a", None, 1);
        assert_eq!(t.resolve_status(), StatusTone::Pending);
        t.set_status(d(2025, 12, 1), Some(TaskStatus::Done));
        t.set_status(d(2025, 12, 3), Some(TaskStatus::Skipped));
        assert_eq!(t.resolve_status(), StatusTone::Skipped);
        t.set_status(d(2025, 12, 3), None);
        assert_eq!(t.resolve_status(), StatusTone::Done);
    }

    #[test]
    fn test_counts() {
        let today = d(2025, 12, 5);
        let mut done = task("done", Some(today), 1);
        done.set_status(today, Some(TaskStatus::Done));
        let tasks = vec![
            done,
            task("today", Some(today), 1),
            task("in-six", Some(d(2025, 12, 11)), 1),
            task("in-seven", Some(d(2025, 12, 12)), 1),
            task("overdue", Some(d(2025, 12, 1)), 1),
            task("undated", None, 1),
        ];
        let counts = count_tasks(&tasks, today);
        assert_eq!(counts.today_pending, 1);
        assert_eq!(counts.next_seven, 2);
        assert_eq!(counts.all_pending, 5);
        assert_eq!(counts.done_today, 1);
        assert_eq!(counts.total, 6);
    }
}
