//! Worker request/response types

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

// ============================================================================
// Credentials
// ============================================================================

/// Opaque credentials forwarded to the worker.
///
/// Never printed in full: `Debug` is redacted and logs only ever see
/// [`Credentials::fingerprint`].
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials(String);

impl Credentials {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Raw secret, for the request body only
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Short non-reversible prefix for diagnostics
    pub fn fingerprint(&self) -> String {
        jobpilot_foundation::mask_secret(&self.0)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Credentials({})", self.fingerprint())
    }
}

// ============================================================================
// Start
// ============================================================================

/// Request to start one automation task
#[derive(Debug, Clone)]
pub struct StartTaskRequest {
    /// Natural-language instructions for the worker
    pub task: String,

    /// Optional credentials, forwarded as-is
    pub credentials: Option<Credentials>,
}

impl StartTaskRequest {
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            credentials: None,
        }
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }
}

/// Wire body for `POST /run-task`
#[derive(Debug, Serialize)]
pub(crate) struct StartTaskBody<'a> {
    pub task: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<&'a str>,
}

impl<'a> From<&'a StartTaskRequest> for StartTaskBody<'a> {
    fn from(req: &'a StartTaskRequest) -> Self {
        Self {
            task: &req.task,
            api_key: req.credentials.as_ref().map(Credentials::expose),
        }
    }
}

/// Wire response for `POST /run-task`
#[derive(Debug, Deserialize)]
pub(crate) struct StartTaskResponse {
    #[serde(alias = "taskId", alias = "id")]
    pub task_id: Option<Value>,
}

impl StartTaskResponse {
    /// Task ids come back as strings or numbers depending on the worker build
    pub fn task_id(&self) -> Option<String> {
        match self.task_id.as_ref()? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

// ============================================================================
// Status
// ============================================================================

/// Coarse remote task state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Running,
    Completed,
    Error,
}

impl TaskState {
    /// Map the worker's status word onto the three states.
    ///
    /// Unknown words count as running so that the poller keeps waiting
    /// instead of misreporting a result.
    pub fn from_worker_status(status: &str) -> Self {
        match status.trim().to_ascii_lowercase().as_str() {
            "completed" | "finished" | "done" | "success" | "succeeded" => TaskState::Completed,
            "error" | "failed" | "failure" | "stopped" | "cancelled" | "canceled" => {
                TaskState::Error
            }
            "running" | "pending" | "queued" | "created" | "started" | "in_progress" | "paused" => {
                TaskState::Running
            }
            other => {
                warn!("Unknown worker status '{}', treating as running", other);
                TaskState::Running
            }
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskState::Completed | TaskState::Error)
    }
}

impl std::fmt::Display for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            TaskState::Running => "running",
            TaskState::Completed => "completed",
            TaskState::Error => "error",
        };
        f.write_str(label)
    }
}

/// One observation of a remote task.
///
/// The payload exists only for `Completed`, the message only for `Error`.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusSnapshot {
    Running,
    Completed(Value),
    Error(String),
}

impl StatusSnapshot {
    pub fn state(&self) -> TaskState {
        match self {
            StatusSnapshot::Running => TaskState::Running,
            StatusSnapshot::Completed(_) => TaskState::Completed,
            StatusSnapshot::Error(_) => TaskState::Error,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state().is_terminal()
    }
}

/// Wire response for `GET /task/{id}/status`
#[derive(Debug, Deserialize)]
pub(crate) struct StatusResponse {
    #[serde(alias = "state")]
    pub status: String,
    #[serde(default, alias = "output")]
    pub result: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl StatusResponse {
    pub fn into_snapshot(self) -> StatusSnapshot {
        match TaskState::from_worker_status(&self.status) {
            TaskState::Running => StatusSnapshot::Running,
            TaskState::Completed => StatusSnapshot::Completed(self.result.unwrap_or(Value::Null)),
            TaskState::Error => StatusSnapshot::Error(
                self.error
                    .or(self.message)
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| format!("Worker reported status '{}'", self.status)),
            ),
        }
    }
}
