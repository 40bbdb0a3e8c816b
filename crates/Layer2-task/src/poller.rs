//! Status Poller - waits for a remote task to reach a terminal state
//!
//! Every attempt reports progress, then issues one status query. Failed
//! queries are treated as "still running": a long poll must survive a flaky
//! tunnel. The deadline is the only exit besides a terminal snapshot or
//! cancellation.

use crate::error::{TaskError, TaskResult};
use crate::progress::{ProgressObserver, ProgressReporter, ProgressStatus};
use crate::task::TaskHandle;
use jobpilot_worker::{StatusSnapshot, WorkerClient};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Polls one task at a fixed interval
#[derive(Clone)]
pub struct StatusPoller {
    client: Arc<dyn WorkerClient>,
    interval: Duration,
}

impl StatusPoller {
    pub fn new(client: Arc<dyn WorkerClient>, interval: Duration) -> Self {
        Self { client, interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Poll until the task is `Completed` or `Error`, or `deadline` elapses.
    pub async fn poll_until_terminal(
        &self,
        handle: &TaskHandle,
        deadline: Duration,
        observer: &dyn ProgressObserver,
    ) -> TaskResult<StatusSnapshot> {
        let mut reporter = ProgressReporter::new(observer, deadline);
        reporter.set_task_id(handle.id());
        self.poll_with(handle, &mut reporter, &CancellationToken::new())
            .await
    }

    /// Poll using an existing reporter, so progress stays monotonic across
    /// the whole orchestration call.
    pub async fn poll_with(
        &self,
        handle: &TaskHandle,
        reporter: &mut ProgressReporter<'_>,
        cancel: &CancellationToken,
    ) -> TaskResult<StatusSnapshot> {
        let deadline = reporter.deadline();
        let mut attempt: u32 = 0;

        loop {
            let elapsed = reporter.elapsed();
            if elapsed >= deadline {
                break;
            }
            if cancel.is_cancelled() {
                return Err(TaskError::Cancelled);
            }

            attempt += 1;
            reporter.emit(
                ProgressStatus::Polling,
                format!(
                    "Waiting for worker (attempt {}, {}s elapsed)",
                    attempt,
                    elapsed.as_secs()
                ),
            );

            // A hung query must not push us past the deadline.
            let remaining = deadline.saturating_sub(elapsed);
            let query = tokio::time::timeout(remaining, self.client.task_status(handle.id()));

            let answer = tokio::select! {
                _ = cancel.cancelled() => return Err(TaskError::Cancelled),
                answer = query => answer,
            };

            match answer {
                Ok(Ok(snapshot)) if snapshot.is_terminal() => {
                    info!(
                        "Task {} reached {} after {} attempt(s)",
                        handle,
                        snapshot.state(),
                        attempt
                    );
                    return Ok(snapshot);
                }
                Ok(Ok(_)) => debug!("Task {} still running", handle),
                Ok(Err(e)) => debug!("Status query for {} failed, will retry: {}", handle, e),
                Err(_) => debug!("Status query for {} timed out at deadline", handle),
            }

            let remaining = reporter.remaining();
            if remaining.is_zero() {
                break;
            }
            tokio::select! {
                _ = cancel.cancelled() => return Err(TaskError::Cancelled),
                _ = tokio::time::sleep(self.interval.min(remaining)) => {}
            }
        }

        info!("Task {} still not terminal after {:?}", handle, deadline);
        Err(TaskError::PollTimeout { deadline })
    }
}
