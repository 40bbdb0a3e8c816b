//! Watchdog - one-shot cleanup for tasks that outlive their runtime ceiling
//!
//! The check runs on a detached tokio task. Its own status query at fire time
//! decides whether a stop is sent; nothing is cached from the poller.

use crate::task::TaskHandle;
use jobpilot_worker::{StatusSnapshot, WorkerClient};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// What the watchdog did when it fired
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchdogVerdict {
    /// Task was already terminal, nothing sent
    AlreadyFinished,
    /// Task was still running and a stop command was accepted
    Stopped,
    /// Status query failed; no stop was sent
    CheckFailed(String),
    /// Stop command failed
    StopFailed(String),
}

/// Schedules best-effort stop checks
#[derive(Clone)]
pub struct Watchdog {
    client: Arc<dyn WorkerClient>,
}

impl Watchdog {
    pub fn new(client: Arc<dyn WorkerClient>) -> Self {
        Self { client }
    }

    /// Schedule one check `max_runtime` from now.
    ///
    /// The returned handle may be dropped; the check still runs.
    pub fn arm(&self, handle: TaskHandle, max_runtime: Duration) -> WatchdogHandle {
        let watchdog = self.clone();
        debug!("Watchdog armed for {} ({:?})", handle, max_runtime);

        let join = tokio::spawn(async move {
            tokio::time::sleep(max_runtime).await;
            watchdog.fire(&handle).await
        });

        WatchdogHandle { join }
    }

    /// Run the check immediately. Never fails; errors become verdicts.
    pub async fn fire(&self, handle: &TaskHandle) -> WatchdogVerdict {
        match self.client.task_status(handle.id()).await {
            Ok(StatusSnapshot::Running) => {}
            Ok(snapshot) => {
                debug!("Watchdog: {} already {}", handle, snapshot.state());
                return WatchdogVerdict::AlreadyFinished;
            }
            Err(e) => {
                warn!("Watchdog status check for {} failed: {}", handle, e);
                return WatchdogVerdict::CheckFailed(e.to_string());
            }
        }

        info!("Watchdog: {} still running past its limit, stopping", handle);
        match self.client.stop_task(handle.id()).await {
            Ok(()) => WatchdogVerdict::Stopped,
            Err(e) => {
                warn!("Watchdog failed to stop {}: {}", handle, e);
                WatchdogVerdict::StopFailed(e.to_string())
            }
        }
    }
}

/// Handle to an armed watchdog
#[derive(Debug)]
pub struct WatchdogHandle {
    join: JoinHandle<WatchdogVerdict>,
}

impl WatchdogHandle {
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the check. `None` if the watchdog was aborted.
    pub async fn verdict(self) -> Option<WatchdogVerdict> {
        self.join.await.ok()
    }

    pub fn abort(&self) {
        self.join.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobpilot_worker::testing::ScriptedWorker;
    use jobpilot_worker::WorkerError;
    use serde_json::json;

    #[tokio::test]
    async fn test_stops_running_task() {
        let worker = Arc::new(ScriptedWorker::new());
        let watchdog = Watchdog::new(worker.clone());

        let armed = watchdog.arm(TaskHandle::new("task-7"), Duration::from_millis(20));
        assert_eq!(armed.verdict().await, Some(WatchdogVerdict::Stopped));
        assert_eq!(worker.stopped_tasks().await, vec!["task-7".to_string()]);
    }

    #[tokio::test]
    async fn test_leaves_finished_task_alone() {
        let worker = Arc::new(ScriptedWorker::running_then(
            0,
            StatusSnapshot::Completed(json!("done")),
        ));
        let watchdog = Watchdog::new(worker.clone());

        let verdict = watchdog.fire(&TaskHandle::new("task-1")).await;
        assert_eq!(verdict, WatchdogVerdict::AlreadyFinished);
        assert_eq!(worker.stop_calls().await, 0);
    }

    #[tokio::test]
    async fn test_errors_are_swallowed() {
        let worker = Arc::new(ScriptedWorker::with_statuses(vec![Err(
            WorkerError::Network("connection reset".into()),
        )]));
        let verdict = Watchdog::new(worker.clone())
            .fire(&TaskHandle::new("task-1"))
            .await;
        assert!(matches!(verdict, WatchdogVerdict::CheckFailed(_)));
        assert_eq!(worker.stop_calls().await, 0);

        let worker = Arc::new(ScriptedWorker::new().failing_stop(WorkerError::NotFound("gone".into())));
        let verdict = Watchdog::new(worker).fire(&TaskHandle::new("task-1")).await;
        assert!(matches!(verdict, WatchdogVerdict::StopFailed(_)));
    }

    #[tokio::test]
    async fn test_does_not_fire_early() {
        let worker = Arc::new(ScriptedWorker::new());
        let armed = Watchdog::new(worker.clone()).arm(TaskHandle::new("task-1"), Duration::from_secs(60));

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(!armed.is_finished());
        assert_eq!(worker.status_calls(), 0);
        armed.abort();
        assert_eq!(armed.verdict().await, None);
    }
}
