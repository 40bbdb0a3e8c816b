//! # jobpilot-task
//!
//! Remote automation task orchestration for JobPilot.
//! Starts a long-running job on the automation worker, waits for it under a
//! hard deadline, and turns the worker's prose report into a typed outcome.
//!
//! ## Components
//!
//! - **Task Launcher** - submits a task description, returns a [`TaskHandle`]
//! - **Status Poller** - polls until terminal or deadline, reporting progress
//! - **Watchdog** - one-shot background stop for tasks that run too long
//! - **Result Classifier** - keyword-table classification of the report
//! - **Orchestrator** - composes all of the above; `run` always returns an outcome
//!
//! ## Example
//!
//! ```ignore
//! use jobpilot_task::{ClassifyContext, KeywordClassifier, Orchestrator, RunRequest, TaskKind};
//!
//! let orchestrator = Orchestrator::new(
//!     client,
//!     Arc::new(KeywordClassifier::for_kind(TaskKind::Application)),
//!     Duration::from_secs(5),
//! );
//! let outcome = orchestrator
//!     .run(&RunRequest::new(description, Duration::from_secs(180)), &NoopObserver)
//!     .await;
//! println!("{}: {}", outcome.status, outcome.message);
//! ```

pub mod classifier;
pub mod error;
pub mod launcher;
pub mod orchestrator;
pub mod poller;
pub mod progress;
pub mod task;
pub mod watchdog;

pub use classifier::{
    Classifier, ClassifierProfile, ClassifyContext, ClassifyError, Contact, Flag,
    KeywordClassifier, OutcomeStatus, StructuredOutcome,
};
pub use error::{TaskError, TaskResult};
pub use launcher::TaskLauncher;
pub use orchestrator::{Orchestrator, RunId, RunRequest};
pub use poller::StatusPoller;
pub use progress::{
    NoopObserver, ProgressObserver, ProgressReporter, ProgressStatus, ProgressUpdate,
    MAX_IN_FLIGHT_PERCENT,
};
pub use task::{TaskHandle, TaskKind};
pub use watchdog::{Watchdog, WatchdogHandle, WatchdogVerdict};
