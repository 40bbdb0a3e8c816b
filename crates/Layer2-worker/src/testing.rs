//! Scripted in-memory worker for tests
//!
//! Replays a fixed sequence of status answers and records every call so tests
//! can assert on what the orchestration layer sent.

use crate::client::WorkerClient;
use crate::error::WorkerError;
use crate::types::{StartTaskRequest, StatusSnapshot};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

/// Stub worker with scripted answers
#[derive(Debug, Default)]
pub struct ScriptedWorker {
    start_error: Option<WorkerError>,
    stop_error: Option<WorkerError>,
    statuses: Mutex<VecDeque<Result<StatusSnapshot, WorkerError>>>,
    last_status: Mutex<Option<Result<StatusSnapshot, WorkerError>>>,
    start_delay: Option<Duration>,
    status_delay: Option<Duration>,
    stop_delay: Option<Duration>,
    started: Mutex<Vec<StartTaskRequest>>,
    stopped: Mutex<Vec<String>>,
    next_id: AtomicUsize,
    status_calls: AtomicUsize,
}

impl ScriptedWorker {
    /// Worker that reports `Running` forever
    pub fn new() -> Self {
        Self::default()
    }

    /// Worker that answers the given statuses in order, then repeats the last one
    pub fn with_statuses(statuses: Vec<Result<StatusSnapshot, WorkerError>>) -> Self {
        Self {
            statuses: Mutex::new(statuses.into()),
            ..Self::default()
        }
    }

    /// `running` answers followed by a final answer
    pub fn running_then(running_polls: usize, last: StatusSnapshot) -> Self {
        let mut statuses: Vec<_> = (0..running_polls).map(|_| Ok(StatusSnapshot::Running)).collect();
        statuses.push(Ok(last));
        Self::with_statuses(statuses)
    }

    pub fn failing_start(mut self, error: WorkerError) -> Self {
        self.start_error = Some(error);
        self
    }

    pub fn failing_stop(mut self, error: WorkerError) -> Self {
        self.stop_error = Some(error);
        self
    }

    /// Delay the start answer. The call counts as sent before the delay.
    pub fn slow_start(mut self, delay: Duration) -> Self {
        self.start_delay = Some(delay);
        self
    }

    /// Delay every status answer
    pub fn slow_status(mut self, delay: Duration) -> Self {
        self.status_delay = Some(delay);
        self
    }

    /// Delay the stop answer. The stop is only recorded once the delay passes.
    pub fn slow_stop(mut self, delay: Duration) -> Self {
        self.stop_delay = Some(delay);
        self
    }

    pub fn start_calls(&self) -> usize {
        self.next_id.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub async fn stop_calls(&self) -> usize {
        self.stopped.lock().await.len()
    }

    pub async fn stopped_tasks(&self) -> Vec<String> {
        self.stopped.lock().await.clone()
    }

    pub async fn started_requests(&self) -> Vec<StartTaskRequest> {
        self.started.lock().await.clone()
    }
}

#[async_trait]
impl WorkerClient for ScriptedWorker {
    async fn start_task(&self, request: &StartTaskRequest) -> Result<String, WorkerError> {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.started.lock().await.push(request.clone());
        if let Some(delay) = self.start_delay {
            tokio::time::sleep(delay).await;
        }
        match &self.start_error {
            Some(err) => Err(err.clone()),
            None => Ok(format!("task-{}", n)),
        }
    }

    async fn task_status(&self, task_id: &str) -> Result<StatusSnapshot, WorkerError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.status_delay {
            tokio::time::sleep(delay).await;
        }

        if self.stopped.lock().await.iter().any(|id| id == task_id) {
            return Ok(StatusSnapshot::Error("Task stopped".to_string()));
        }

        let next = self.statuses.lock().await.pop_front();
        let mut last = self.last_status.lock().await;
        match next {
            Some(answer) => {
                *last = Some(answer.clone());
                answer
            }
            None => last.clone().unwrap_or(Ok(StatusSnapshot::Running)),
        }
    }

    async fn stop_task(&self, task_id: &str) -> Result<(), WorkerError> {
        if let Some(delay) = self.stop_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = &self.stop_error {
            return Err(err.clone());
        }
        self.stopped.lock().await.push(task_id.to_string());
        Ok(())
    }

    fn endpoint(&self) -> &str {
        "scripted://worker"
    }
}
