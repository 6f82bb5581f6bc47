//! HTTP client for the remote chores API.
//!
//! Every request and every response or error is logged. Failures are handed
//! back unchanged; only GET requests may be retried, and only when
//! `read_retries` is configured.

use crate::config::ClientConfig;
use crate::errors::ApiError;
use crate::models::{
    AnalyticsSnapshot, NewRoommate, NewTask, NewTaskType, Roommate, Task, TaskType,
};
use reqwest::{Client, Method};
use serde::{de::DeserializeOwned, Serialize};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

const RETRY_DELAY: Duration = Duration::from_millis(200);

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    config: ClientConfig,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ApiError::Transport)?;
        Ok(Self { http, config })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url, path.trim_start_matches('/'))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let mut attempt = 0;
        loop {
            match self.send::<(), T>(Method::GET, path, None).await {
                Err(err) if attempt < self.config.read_retries && err.is_retryable() => {
                    attempt += 1;
                    warn!("retrying GET {path} (attempt {attempt}): {err}");
                    tokio::time::sleep(RETRY_DELAY * attempt).await;
                }
                result => return result,
            }
        }
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::POST, path, Some(body)).await
    }

    async fn send<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        let mut request = self.http.request(method.clone(), &url);
        if let Some(body) = body {
            request = request.json(body);
        }
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        info!("request: {method} {url}");
        let started = Instant::now();
        let response = request.send().await.map_err(|err| {
            error!("request error: {method} {url}: {err}");
            ApiError::Transport(err)
        })?;

        let status = response.status();
        let elapsed_ms = started.elapsed().as_millis();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!("response error: {method} {url} -> {status} in {elapsed_ms}ms: {message}");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        info!("response: {method} {url} -> {status} in {elapsed_ms}ms");
        response.json::<T>().await.map_err(|err| {
            error!("response error: {method} {url}: undecodable body: {err}");
            ApiError::Decode(err)
        })
    }

    pub async fn tasks(&self) -> Result<Vec<Task>, ApiError> {
        self.get("tasks").await
    }

    pub async fn create_task(&self, task: &NewTask) -> Result<Task, ApiError> {
        self.post("tasks", task).await
    }

    pub async fn roommates(&self) -> Result<Vec<Roommate>, ApiError> {
        self.get("roommates").await
    }

    pub async fn create_roommate(&self, roommate: &NewRoommate) -> Result<Roommate, ApiError> {
        self.post("roommates", roommate).await
    }

    pub async fn task_types(&self) -> Result<Vec<TaskType>, ApiError> {
        self.get("task-types").await
    }

    pub async fn create_task_type(&self, task_type: &NewTaskType) -> Result<TaskType, ApiError> {
        self.post("task-types", task_type).await
    }

    pub async fn analytics(&self) -> Result<AnalyticsSnapshot, ApiError> {
        self.get("analytics").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_join_base_and_path_with_one_slash() {
        let client = ApiClient::new(ClientConfig::new("http://api.local/v1/")).unwrap();
        assert_eq!(client.url("tasks"), "http://api.local/v1/tasks");
        assert_eq!(client.url("/task-types"), "http://api.local/v1/task-types");
        assert_eq!(client.base_url(), "http://api.local/v1");
    }
}
