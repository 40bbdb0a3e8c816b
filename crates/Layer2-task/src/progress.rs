//! Progress reporting for a single orchestration call
//!
//! Updates are pushed to a caller-supplied [`ProgressObserver`]. The
//! [`ProgressReporter`] owns the clock and guarantees that percentages never
//! go backwards and that exactly one update reaches 100.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Highest percentage reported before a terminal result is classified
pub const MAX_IN_FLIGHT_PERCENT: u8 = 99;

/// Coarse phase label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    Starting,
    Preparing,
    Polling,
    /// Terminal payload received, classification in progress
    Processing,
    Done,
    Error,
}

impl ProgressStatus {
    pub fn display_name(&self) -> &'static str {
        match self {
            ProgressStatus::Starting => "starting",
            ProgressStatus::Preparing => "preparing",
            ProgressStatus::Polling => "polling",
            ProgressStatus::Processing => "processing",
            ProgressStatus::Done => "done",
            ProgressStatus::Error => "error",
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, ProgressStatus::Done | ProgressStatus::Error)
    }
}

impl std::fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One progress event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    pub status: ProgressStatus,
    pub progress_percent: u8,
    pub elapsed_seconds: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    pub emitted_at: DateTime<Utc>,
}

/// Receives progress updates
pub trait ProgressObserver: Send + Sync {
    fn on_update(&self, update: ProgressUpdate);
}

impl<F> ProgressObserver for F
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn on_update(&self, update: ProgressUpdate) {
        self(update)
    }
}

impl ProgressObserver for mpsc::UnboundedSender<ProgressUpdate> {
    fn on_update(&self, update: ProgressUpdate) {
        // receiver gone: the caller stopped listening, which is fine
        let _ = self.send(update);
    }
}

/// Observer that drops every update
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {
    fn on_update(&self, _update: ProgressUpdate) {}
}

/// Stateful emitter shared by the facade and the poller
pub struct ProgressReporter<'a> {
    observer: &'a dyn ProgressObserver,
    started: Instant,
    deadline: Duration,
    last_percent: u8,
    task_id: Option<String>,
    finished: bool,
}

impl<'a> ProgressReporter<'a> {
    pub fn new(observer: &'a dyn ProgressObserver, deadline: Duration) -> Self {
        Self {
            observer,
            started: Instant::now(),
            deadline,
            last_percent: 0,
            task_id: None,
            finished: false,
        }
    }

    pub fn set_task_id(&mut self, task_id: impl Into<String>) {
        self.task_id = Some(task_id.into());
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Time left before the deadline, zero once it has passed
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_sub(self.elapsed())
    }

    pub fn last_percent(&self) -> u8 {
        self.last_percent
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// `min(99, round(100 * elapsed / deadline))`
    pub fn estimate_percent(&self) -> u8 {
        percent_of(self.elapsed(), self.deadline)
    }

    /// Emit an in-flight update. Ignored once the reporter has finished.
    pub fn emit(&mut self, status: ProgressStatus, message: impl Into<String>) {
        if self.finished {
            return;
        }
        let percent = self.estimate_percent().max(self.last_percent);
        self.send(status, percent, message.into());
    }

    /// Emit the single final update at 100%.
    pub fn finish(&mut self, status: ProgressStatus, message: impl Into<String>) {
        if self.finished {
            return;
        }
        self.finished = true;
        self.send(status, 100, message.into());
    }

    fn send(&mut self, status: ProgressStatus, percent: u8, message: String) {
        self.last_percent = percent;
        let update = ProgressUpdate {
            status,
            progress_percent: percent,
            elapsed_seconds: self.elapsed().as_secs(),
            message: (!message.is_empty()).then_some(message),
            task_id: self.task_id.clone(),
            emitted_at: Utc::now(),
        };
        self.observer.on_update(update);
    }
}

fn percent_of(elapsed: Duration, deadline: Duration) -> u8 {
    if deadline.is_zero() {
        return MAX_IN_FLIGHT_PERCENT;
    }
    let ratio = 100.0 * elapsed.as_secs_f64() / deadline.as_secs_f64();
    ratio.round().min(MAX_IN_FLIGHT_PERCENT as f64).max(0.0) as u8
}
