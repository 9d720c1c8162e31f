use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use shared::{
    domain::{Task, TaskId},
    error::ApiError,
    protocol::{CreateTaskRequest, UpdateTaskRequest},
};
use tracing::debug;
use url::Url;

use crate::{config::ClientSettings, error::TransportError};

const TASKS_PATH: [&str; 2] = ["api", "todos"];
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Stateless request/response access to the task service.
///
/// Every call is a single exchange. Mutations report only success or
/// failure; callers re-fetch the collection to observe their effect.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn list_tasks(&self) -> Result<Vec<Task>, TransportError>;
    async fn create_task(&self, title: &str) -> Result<(), TransportError>;
    async fn set_completed(&self, id: &TaskId, completed: bool) -> Result<(), TransportError>;
    async fn rename_task(&self, id: &TaskId, title: &str) -> Result<(), TransportError>;
    async fn delete_task(&self, id: &TaskId) -> Result<(), TransportError>;
}

#[async_trait]
impl<T> TaskStore for Arc<T>
where
    T: TaskStore + ?Sized,
{
    async fn list_tasks(&self) -> Result<Vec<Task>, TransportError> {
        (**self).list_tasks().await
    }

    async fn create_task(&self, title: &str) -> Result<(), TransportError> {
        (**self).create_task(title).await
    }

    async fn set_completed(&self, id: &TaskId, completed: bool) -> Result<(), TransportError> {
        (**self).set_completed(id, completed).await
    }

    async fn rename_task(&self, id: &TaskId, title: &str) -> Result<(), TransportError> {
        (**self).rename_task(id, title).await
    }

    async fn delete_task(&self, id: &TaskId) -> Result<(), TransportError> {
        (**self).delete_task(id).await
    }
}

pub struct HttpTaskStore {
    http: Client,
    base_url: Url,
}

impl HttpTaskStore {
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Self, TransportError> {
        Self::with_timeout(&settings.base_url, settings.request_timeout)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(TransportError::Client)?;
        Self::with_client(http, base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self, TransportError> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|err| TransportError::invalid_url(base_url, err))?;
        if base_url.cannot_be_a_base() {
            return Err(TransportError::invalid_url(
                base_url.as_str(),
                "url cannot carry a path",
            ));
        }
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(TransportError::invalid_url(
                base_url.as_str(),
                "scheme must be http or https",
            ));
        }
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, id: Option<&TaskId>) -> Result<Url, TransportError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| TransportError::invalid_url(self.base_url.as_str(), "no path"))?;
            segments.pop_if_empty().extend(TASKS_PATH);
            if let Some(id) = id {
                segments.push(id.as_str());
            }
        }
        Ok(url)
    }

    async fn execute(&self, url: &Url, request: RequestBuilder) -> Result<Response, TransportError> {
        let response = request.send().await.map_err(|source| TransportError::Request {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let api = response.json::<ApiError>().await.ok();
        Err(TransportError::Status {
            url: url.to_string(),
            status,
            api,
        })
    }

    async fn update(&self, id: &TaskId, body: &UpdateTaskRequest) -> Result<(), TransportError> {
        let url = self.endpoint(Some(id))?;
        self.execute(&url, self.http.put(url.clone()).json(body))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl TaskStore for HttpTaskStore {
    async fn list_tasks(&self) -> Result<Vec<Task>, TransportError> {
        let url = self.endpoint(None)?;
        let response = self.execute(&url, self.http.get(url.clone())).await?;
        let tasks: Vec<Task> = response
            .json()
            .await
            .map_err(|source| TransportError::Decode {
                url: url.to_string(),
                source,
            })?;
        debug!(count = tasks.len(), "store: listed tasks");
        Ok(tasks)
    }

    async fn create_task(&self, title: &str) -> Result<(), TransportError> {
        let url = self.endpoint(None)?;
        let body = CreateTaskRequest {
            title: title.to_string(),
        };
        self.execute(&url, self.http.post(url.clone()).json(&body))
            .await?;
        debug!("store: created task");
        Ok(())
    }

    async fn set_completed(&self, id: &TaskId, completed: bool) -> Result<(), TransportError> {
        self.update(id, &UpdateTaskRequest::completed(completed))
            .await?;
        debug!(task_id = %id, completed, "store: updated completion");
        Ok(())
    }

    async fn rename_task(&self, id: &TaskId, title: &str) -> Result<(), TransportError> {
        self.update(id, &UpdateTaskRequest::title(title)).await?;
        debug!(task_id = %id, "store: renamed task");
        Ok(())
    }

    async fn delete_task(&self, id: &TaskId) -> Result<(), TransportError> {
        let url = self.endpoint(Some(id))?;
        self.execute(&url, self.http.delete(url.clone())).await?;
        debug!(task_id = %id, "store: deleted task");
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
