//! Task Launcher - submits one task description to the worker

use crate::error::{TaskError, TaskResult};
use crate::task::TaskHandle;
use jobpilot_worker::{Credentials, StartTaskRequest, WorkerClient};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Starts remote tasks. No retries: a failed start is reported to the caller.
#[derive(Clone)]
pub struct TaskLauncher {
    client: Arc<dyn WorkerClient>,
}

impl TaskLauncher {
    pub fn new(client: Arc<dyn WorkerClient>) -> Self {
        Self { client }
    }

    /// Submit `description` and return the worker-assigned handle
    pub async fn launch(
        &self,
        description: &str,
        credentials: Option<&Credentials>,
    ) -> TaskResult<TaskHandle> {
        let description = description.trim();
        if description.is_empty() {
            return Err(TaskError::InvalidInput(
                "task description must not be empty".to_string(),
            ));
        }

        let mut request = StartTaskRequest::new(description);
        if let Some(creds) = credentials {
            debug!("Forwarding credentials {}", creds.fingerprint());
            request = request.with_credentials(creds.clone());
        }

        info!(
            "Launching task on {} ({} chars)",
            self.client.endpoint(),
            description.chars().count()
        );

        match self.client.start_task(&request).await {
            Ok(task_id) => Ok(TaskHandle::new(task_id)),
            Err(e) => {
                warn!("Task launch failed: {}", e);
                Err(TaskError::LaunchFailure(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobpilot_worker::testing::ScriptedWorker;
    use jobpilot_worker::WorkerError;

    #[tokio::test]
    async fn test_launch_returns_handle() {
        let worker = Arc::new(ScriptedWorker::new());
        let launcher = TaskLauncher::new(worker.clone());

        let creds = Credentials::new("sk-123456");
        let handle = launcher
            .launch("  Apply to the job  ", Some(&creds))
            .await
            .unwrap();
        assert_eq!(handle.id(), "task-1");

        let sent = worker.started_requests().await;
        assert_eq!(sent[0].task, "Apply to the job");
        assert_eq!(sent[0].credentials.as_ref(), Some(&creds));
    }

    #[tokio::test]
    async fn test_empty_description_is_rejected_without_call() {
        let worker = Arc::new(ScriptedWorker::new());
        let launcher = TaskLauncher::new(worker.clone());

        let err = launcher.launch("   ", None).await.unwrap_err();
        assert!(matches!(err, TaskError::InvalidInput(_)));
        assert_eq!(worker.start_calls(), 0);
    }

    #[tokio::test]
    async fn test_launch_failure_is_not_retried() {
        let worker = Arc::new(ScriptedWorker::new().failing_start(WorkerError::MissingTaskId));
        let launcher = TaskLauncher::new(worker.clone());

        let err = launcher.launch("Apply", None).await.unwrap_err();
        assert_eq!(err, TaskError::LaunchFailure(WorkerError::MissingTaskId));
        assert_eq!(worker.start_calls(), 1);
    }
}
