//! HTTP implementation of [`WorkerClient`]
//!
//! Endpoints (relative to the tunnel base URL):
//! - `POST /run-task`          `{task, api_key?}` -> `{task_id}`
//! - `GET  /task/{id}/status`  -> `{status, result?, message?}`
//! - `POST /task/{id}/stop`

use crate::client::WorkerClient;
use crate::error::WorkerError;
use crate::types::{StartTaskBody, StartTaskRequest, StartTaskResponse, StatusResponse, StatusSnapshot};
use async_trait::async_trait;
use jobpilot_foundation::WorkerSettings;
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::{debug, info};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Automation worker reached over HTTP
#[derive(Debug, Clone)]
pub struct HttpWorkerClient {
    client: Client,
    base_url: String,
}

impl HttpWorkerClient {
    /// Create a client with the default request timeout
    pub fn new(base_url: impl Into<String>) -> Result<Self, WorkerError> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client whose individual requests time out after `timeout`
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, WorkerError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WorkerError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Build from resolved settings
    pub fn from_settings(settings: &WorkerSettings) -> Result<Self, WorkerError> {
        Self::with_timeout(settings.effective_base_url(), settings.request_timeout())
    }

    fn start_url(&self) -> String {
        format!("{}/run-task", self.base_url)
    }

    fn status_url(&self, task_id: &str) -> String {
        format!("{}/task/{}/status", self.base_url, task_id)
    }

    fn stop_url(&self, task_id: &str) -> String {
        format!("{}/task/{}/stop", self.base_url, task_id)
    }

    /// Turn non-success responses into typed errors, keeping the body text
    async fn check_status(response: Response) -> Result<Response, WorkerError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let body = if body.trim().is_empty() {
            status.canonical_reason().unwrap_or("no response body").to_string()
        } else {
            body
        };
        Err(WorkerError::from_http_status(status.as_u16(), &body))
    }
}

#[async_trait]
impl WorkerClient for HttpWorkerClient {
    async fn start_task(&self, request: &StartTaskRequest) -> Result<String, WorkerError> {
        let response = self
            .client
            .post(self.start_url())
            .json(&StartTaskBody::from(request))
            .send()
            .await
            .map_err(|e| WorkerError::Network(e.to_string()))?;

        let body: StartTaskResponse = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| WorkerError::InvalidResponse(e.to_string()))?;

        let task_id = body.task_id().ok_or(WorkerError::MissingTaskId)?;
        info!("Worker accepted task {} at {}", task_id, self.base_url);
        Ok(task_id)
    }

    async fn task_status(&self, task_id: &str) -> Result<StatusSnapshot, WorkerError> {
        let response = self
            .client
            .get(self.status_url(task_id))
            .send()
            .await
            .map_err(|e| WorkerError::Network(e.to_string()))?;

        let body: StatusResponse = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| WorkerError::InvalidResponse(e.to_string()))?;

        debug!("Task {} status: {}", task_id, body.status);
        Ok(body.into_snapshot())
    }

    async fn stop_task(&self, task_id: &str) -> Result<(), WorkerError> {
        let response = self
            .client
            .post(self.stop_url(task_id))
            .send()
            .await
            .map_err(|e| WorkerError::Network(e.to_string()))?;

        Self::check_status(response).await?;
        info!("Stop command accepted for task {}", task_id);
        Ok(())
    }

    fn endpoint(&self) -> &str {
        &self.base_url
    }
}
