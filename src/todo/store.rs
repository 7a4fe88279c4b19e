use std::sync::Arc;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use crate::error::{ErrorKind, GaiaError};
use crate::storage::UserStorage;
use crate::todo::model::{Task, TaskStatus};

pub const TASK_INDEX_KEY: &str = "gaia.todo.index";
const TASK_KEY_PREFIX: &str = "gaia.todo.task.";

/// Persistence seam for tasks. Each task is written on its own, so a batch of
/// updates can partially succeed.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Task>, GaiaError>;
    async fn get(&self, task_id: &str) -> Result<Option<Task>, GaiaError>;
    async fn upsert(&self, task: &Task) -> Result<(), GaiaError>;
    async fn update_due_date(&self, task_id: &str, due_date: Option<NaiveDate>) -> Result<(), GaiaError>;
}

/// [`TaskStore`] over a [`UserStorage`]: one key per task plus an id index.
pub struct StorageTaskStore<S: UserStorage + ?Sized> {
    storage: Arc<S>,
}

impl<S: UserStorage + ?Sized> StorageTaskStore<S> {
    pub fn new(storage: Arc<S>) -> Self {
        StorageTaskStore { storage }
    }

    fn task_key(task_id: &str) -> String {
        format!("{}{}", TASK_KEY_PREFIX, task_id)
    }

    async fn read_index(&self) -> Result<Vec<String>, GaiaError> {
        match self.storage.read(TASK_INDEX_KEY).await? {
            Some(value) => serde_json::from_value(value).map_err(|e| {
                GaiaError::from(e).with_context(format!("key: {}", TASK_INDEX_KEY))
            }),
            None => Ok(Vec::new()),
        }
    }

    async fn write_task(&self, task: &Task) -> Result<(), GaiaError> {
        let value = serde_json::to_value(task)?;
        self.storage
            .write(&Self::task_key(&task.id), value)
            .await
            .map_err(|e| {
                GaiaError::persistence(e.message.clone(), "task_write")
                    .with_context(format!("task: {}", task.id))
                    .with_source(e.to_string())
            })
    }
}

#[async_trait]
impl<S: UserStorage + ?Sized> TaskStore for StorageTaskStore<S> {
    async fn list(&self) -> Result<Vec<Task>, GaiaError> {
        let mut tasks = Vec::new();
        for id in self.read_index().await? {
            match self.get(&id).await {
                Ok(Some(task)) => tasks.push(task),
                Ok(None) => tracing::debug!(task_id = %id, "Indexed task has no record"),
                Err(e) => tracing::warn!(task_id = %id, error = %e, "Skipping unreadable task"),
            }
        }
        Ok(tasks)
    }

    async fn get(&self, task_id: &str) -> Result<Option<Task>, GaiaError> {
        match self.storage.read(&Self::task_key(task_id)).await? {
            Some(value) => Ok(Some(serde_json::from_value::<Task>(value)?)),
            None => Ok(None),
        }
    }

    async fn upsert(&self, task: &Task) -> Result<(), GaiaError> {
        self.write_task(task).await?;

        let mut index = self.read_index().await?;
        if !index.iter().any(|id| *id == task.id) {
            index.push(task.id.clone());
            self.storage.write(TASK_INDEX_KEY, Value::from(index)).await?;
        }
        Ok(())
    }

    async fn update_due_date(&self, task_id: &str, due_date: Option<NaiveDate>) -> Result<(), GaiaError> {
        let mut task = self.get(task_id).await?.ok_or_else(|| {
            GaiaError::new(ErrorKind::State, "Task not found", "task_update")
                .with_context(format!("task: {}", task_id))
        })?;
        task.due_date = due_date;
        self.write_task(&task).await
    }
}

/// Set or clear a task's status for the date it applies to.
pub async fn set_task_status<S: TaskStore + ?Sized>(
    store: &S,
    task_id: &str,
    status: Option<TaskStatus>,
    today: NaiveDate,
) -> Result<Task, GaiaError> {
    let mut task = store.get(task_id).await?.ok_or_else(|| {
        GaiaError::new(ErrorKind::State, "Task not found", "task_status")
            .with_context(format!("task: {}", task_id))
    })?;
    let date = task.status_date(today);
    task.set_status(date, status);
    store.upsert(&task).await?;
    tracing::info!(task_id, date = %date, status = ?status, "Updated task status");
    Ok(task)
}
