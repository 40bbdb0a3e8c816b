//! Orchestration Facade - launch, poll, classify, always return an outcome
//!
//! ```text
//! idle -> launching -> polling -> processing -> done
//!            |            |            |
//!            +------------+------------+--> failed
//! ```
//!
//! Every stage that can fail is folded into a `failed` [`StructuredOutcome`];
//! `run` has no error path. Exactly one 100% progress update is emitted per
//! call, whatever the exit.
//!
//! ## 사용 예시
//!
//! ```ignore
//! let orchestrator = Orchestrator::new(client, Arc::new(KeywordClassifier::for_kind(kind)), interval);
//! let request = RunRequest::new(description, Duration::from_secs(180))
//!     .with_credentials(creds)
//!     .with_context(ClassifyContext::new("Backend Engineer", "Acme"));
//!
//! let outcome = orchestrator.run(&request, &|update| println!("{:?}", update)).await;
//! ```

use crate::classifier::{ClassifyContext, Classifier, StructuredOutcome};
use crate::error::TaskError;
use crate::launcher::TaskLauncher;
use crate::poller::StatusPoller;
use crate::progress::{ProgressObserver, ProgressReporter, ProgressStatus};
use crate::task::TaskHandle;
use crate::watchdog::{Watchdog, WatchdogHandle};
use jobpilot_worker::{Credentials, StatusSnapshot, WorkerClient};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument, Span};

// ============================================================================
// Run identity / request
// ============================================================================

/// Local id for one orchestration call, used to correlate log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunId(pub uuid::Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // first uuid field, i.e. the first 8 hex digits
        write!(f, "run-{:08x}", self.0.as_fields().0)
    }
}

/// Inputs of one `run` call
#[derive(Debug, Clone)]
pub struct RunRequest {
    /// Natural-language instructions for the worker
    pub description: String,
    pub credentials: Option<Credentials>,
    /// Bounds launch, polling and the watchdog, all measured from the start of `run`
    pub deadline: Duration,
    pub context: ClassifyContext,
}

impl RunRequest {
    pub fn new(description: impl Into<String>, deadline: Duration) -> Self {
        Self {
            description: description.into(),
            credentials: None,
            deadline,
            context: ClassifyContext::default(),
        }
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_context(mut self, context: ClassifyContext) -> Self {
        self.context = context;
        self
    }
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Composes launcher, poller, watchdog and classifier
#[derive(Clone)]
pub struct Orchestrator {
    client: Arc<dyn WorkerClient>,
    launcher: TaskLauncher,
    poller: StatusPoller,
    watchdog: Watchdog,
    classifier: Arc<dyn Classifier>,
}

impl Orchestrator {
    pub fn new(
        client: Arc<dyn WorkerClient>,
        classifier: Arc<dyn Classifier>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            launcher: TaskLauncher::new(client.clone()),
            poller: StatusPoller::new(client.clone(), poll_interval),
            watchdog: Watchdog::new(client.clone()),
            client,
            classifier,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poller.interval()
    }

    /// Run one task to completion. Never fails.
    pub async fn run(
        &self,
        request: &RunRequest,
        observer: &dyn ProgressObserver,
    ) -> StructuredOutcome {
        self.run_with_cancel(request, observer, &CancellationToken::new())
            .await
    }

    /// [`run`](Self::run) that can be cut short through `cancel`.
    ///
    /// A cancelled run sends a best-effort stop for the launched task and
    /// returns a `failed` outcome.
    pub async fn run_with_cancel(
        &self,
        request: &RunRequest,
        observer: &dyn ProgressObserver,
        cancel: &CancellationToken,
    ) -> StructuredOutcome {
        let run_id = RunId::new();
        let span = info_span!("run", run_id = %run_id, task_id = tracing::field::Empty);

        async {
            let mut reporter = ProgressReporter::new(observer, request.deadline);
            let outcome = self.drive(request, &mut reporter, cancel).await;

            let (status, message) = match &outcome {
                Ok(outcome) => (ProgressStatus::Done, outcome.message.clone()),
                Err(outcome) => (ProgressStatus::Error, outcome.message.clone()),
            };
            reporter.finish(status, message);

            let outcome = outcome.unwrap_or_else(|failed| failed);
            info!("Run finished: {} ({})", outcome.status, outcome.message);
            outcome
        }
        .instrument(span)
        .await
    }

    /// `Ok` once a report was classified, `Err` with a synthesized failure otherwise.
    async fn drive(
        &self,
        request: &RunRequest,
        reporter: &mut ProgressReporter<'_>,
        cancel: &CancellationToken,
    ) -> Result<StructuredOutcome, StructuredOutcome> {
        // launching
        reporter.emit(ProgressStatus::Starting, "Launching automation task");
        let launch = tokio::time::timeout(
            reporter.remaining(),
            self.launcher
                .launch(&request.description, request.credentials.as_ref()),
        );
        let launched = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(TaskError::Cancelled),
            launched = launch => launched.unwrap_or(Err(TaskError::LaunchTimeout {
                deadline: request.deadline,
            })),
        };
        let handle = launched.map_err(|e| failure_from(&e, launch_details(&e)))?;

        Span::current().record("task_id", handle.id());
        reporter.set_task_id(handle.id());

        // Same clock as the poller: due exactly when polling gives up.
        // Detached, so it still fires if this call returns early.
        let watchdog = self.watchdog.arm(handle.clone(), reporter.remaining());

        reporter.emit(
            ProgressStatus::Polling,
            format!("Task {} started, waiting for the worker", handle),
        );

        // polling
        let snapshot = match self.poller.poll_with(&handle, reporter, cancel).await {
            Ok(snapshot) => snapshot,
            Err(TaskError::Cancelled) => {
                self.stop_quietly(&handle).await;
                let err = TaskError::Cancelled;
                return Err(failure_from(&err, format!("Task {} cancelled by caller", handle)));
            }
            Err(e) => {
                self.await_watchdog(&handle, watchdog).await;
                let details = format!("Task {} produced no terminal state: {}", handle, e);
                return Err(failure_from(&e, details));
            }
        };

        // processing
        match snapshot {
            StatusSnapshot::Completed(payload) => {
                reporter.emit(ProgressStatus::Processing, "Analyzing worker report");
                Ok(self.classifier.classify(&payload, &request.context))
            }
            StatusSnapshot::Error(message) => {
                warn!("Task {} failed on the worker: {}", handle, message);
                Err(StructuredOutcome::failed(
                    format!("Automation task failed: {}", message),
                    message,
                ))
            }
            StatusSnapshot::Running => Err(StructuredOutcome::failed(
                "Automation task ended in a non-terminal state",
                format!("Task {} reported running after polling ended", handle),
            )),
        }
    }

    /// Best-effort stop, bounded by one poll interval
    async fn stop_quietly(&self, handle: &TaskHandle) {
        let stop = self.client.stop_task(handle.id());
        match tokio::time::timeout(self.poller.interval(), stop).await {
            Ok(Ok(())) => debug!("Stopped cancelled task {}", handle),
            Ok(Err(e)) => warn!("Failed to stop cancelled task {}: {}", handle, e),
            Err(_) => warn!("Stop for cancelled task {} timed out", handle),
        }
    }

    /// Let a due watchdog finish before returning, so a process exiting right
    /// after `run` does not kill it. Bounded by one poll interval.
    async fn await_watchdog(&self, handle: &TaskHandle, watchdog: WatchdogHandle) {
        match tokio::time::timeout(self.poller.interval(), watchdog.verdict()).await {
            Ok(Some(verdict)) => debug!("Watchdog for {}: {:?}", handle, verdict),
            Ok(None) => warn!("Watchdog for {} was aborted", handle),
            Err(_) => warn!("Watchdog for {} still pending, left detached", handle),
        }
    }
}

fn failure_from(err: &TaskError, details: String) -> StructuredOutcome {
    warn!("Run failed: {}", err);
    StructuredOutcome::failed(err.to_string(), details)
}

/// Rawest diagnostic for a failed launch: the worker's own error text
fn launch_details(err: &TaskError) -> String {
    match err {
        TaskError::LaunchFailure(worker) => worker.to_string(),
        other => other.to_string(),
    }
}
