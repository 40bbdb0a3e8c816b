//! Orchestration errors
//!
//! Only launch failures, timeouts and cancellation ever leave a stage;
//! the facade turns all of them into a `failed` outcome.

use jobpilot_foundation::Error as FoundationError;
use jobpilot_worker::WorkerError;
use std::time::Duration;
use thiserror::Error;

pub type TaskResult<T> = std::result::Result<T, TaskError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// Rejected before anything was sent to the worker
    #[error("Invalid task: {0}")]
    InvalidInput(String),

    /// Start call rejected or malformed response
    #[error("Failed to start automation task: {0}")]
    LaunchFailure(#[from] WorkerError),

    /// Start call still pending when the deadline passed
    #[error("Task did not start within {}s", .deadline.as_secs())]
    LaunchTimeout { deadline: Duration },

    /// No terminal state observed before the deadline
    #[error("Task did not finish within {}s", .deadline.as_secs())]
    PollTimeout { deadline: Duration },

    /// External cancellation while waiting
    #[error("Task was cancelled")]
    Cancelled,
}

impl From<TaskError> for FoundationError {
    fn from(err: TaskError) -> Self {
        match err {
            TaskError::InvalidInput(msg) => FoundationError::InvalidInput(msg),
            TaskError::LaunchFailure(e) => e.into(),
            TaskError::LaunchTimeout { deadline } => FoundationError::Timeout(format!(
                "task did not start within {}s",
                deadline.as_secs()
            )),
            TaskError::PollTimeout { deadline } => FoundationError::Timeout(format!(
                "task did not finish within {}s",
                deadline.as_secs()
            )),
            TaskError::Cancelled => FoundationError::Cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = TaskError::PollTimeout {
            deadline: Duration::from_secs(180),
        };
        assert_eq!(err.to_string(), "Task did not finish within 180s");

        let err = TaskError::from(WorkerError::from_http_status(500, "worker crashed"));
        assert_eq!(
            err.to_string(),
            "Failed to start automation task: Server error (500): worker crashed"
        );
    }

    #[test]
    fn test_into_foundation() {
        let err: FoundationError = TaskError::Cancelled.into();
        assert!(matches!(err, FoundationError::Cancelled));

        let err: FoundationError = TaskError::PollTimeout {
            deadline: Duration::from_secs(5),
        }
        .into();
        assert!(matches!(err, FoundationError::Timeout(_)));

        let err: FoundationError = TaskError::LaunchTimeout {
            deadline: Duration::from_secs(5),
        }
        .into();
        assert!(matches!(err, FoundationError::Timeout(_)));
    }
}
