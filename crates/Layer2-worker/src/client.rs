//! WorkerClient trait
//!
//! The three verbs the orchestration layer uses against the remote worker's
//! task registry. Status queries and stop commands are safe to repeat.

use crate::error::WorkerError;
use crate::types::{StartTaskRequest, StatusSnapshot};
use async_trait::async_trait;

#[async_trait]
pub trait WorkerClient: Send + Sync {
    /// Start a task; returns the worker-assigned task id
    async fn start_task(&self, request: &StartTaskRequest) -> Result<String, WorkerError>;

    /// Query the current state of a task
    async fn task_status(&self, task_id: &str) -> Result<StatusSnapshot, WorkerError>;

    /// Ask the worker to stop a task
    async fn stop_task(&self, task_id: &str) -> Result<(), WorkerError>;

    /// Human-readable endpoint description, for logs
    fn endpoint(&self) -> &str;
}
