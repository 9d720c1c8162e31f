use std::sync::Arc;

use shared::{
    domain::{normalize_title, Task, TaskId},
    error::ApiError,
    protocol::UpdateTaskRequest,
};
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory task collection, kept in insertion order.
#[derive(Clone, Default)]
pub struct TaskBoard {
    tasks: Arc<RwLock<Vec<Task>>>,
}

impl TaskBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn list_tasks(&self) -> Vec<Task> {
        self.tasks.read().await.clone()
    }

    pub async fn create_task(&self, title: &str) -> Result<Task, ApiError> {
        let title = normalize_title(title)
            .ok_or_else(|| ApiError::validation("title must not be blank"))?;
        let task = Task {
            id: TaskId(Uuid::new_v4().to_string()),
            title,
            completed: false,
        };
        self.tasks.write().await.push(task.clone());
        Ok(task)
    }

    pub async fn update_task(
        &self,
        id: &TaskId,
        update: UpdateTaskRequest,
    ) -> Result<Task, ApiError> {
        let title = match update.title {
            Some(raw) => Some(
                normalize_title(&raw)
                    .ok_or_else(|| ApiError::validation("title must not be blank"))?,
            ),
            None => None,
        };

        let mut tasks = self.tasks.write().await;
        let task = tasks
            .iter_mut()
            .find(|task| &task.id == id)
            .ok_or_else(|| missing(id))?;
        if let Some(title) = title {
            task.title = title;
        }
        if let Some(completed) = update.completed {
            task.completed = completed;
        }
        Ok(task.clone())
    }

    pub async fn delete_task(&self, id: &TaskId) -> Result<(), ApiError> {
        let mut tasks = self.tasks.write().await;
        let pos = tasks
            .iter()
            .position(|task| &task.id == id)
            .ok_or_else(|| missing(id))?;
        tasks.remove(pos);
        Ok(())
    }
}

fn missing(id: &TaskId) -> ApiError {
    ApiError::not_found(format!("task {id} not found"))
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
