//! # jobpilot-worker
//!
//! Client for the remote browser-automation worker.
//! The worker is reached through a tunnel URL and exposes three verbs:
//! start a task, query its status, stop it.
//!
//! ## Features
//! - `WorkerClient` trait so the orchestration layer can run against stubs
//! - HTTP implementation with typed errors and status normalization
//! - Credentials that never leak into logs

pub mod client;
pub mod error;
pub mod http;
pub mod types;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use client::WorkerClient;
pub use error::WorkerError;
pub use http::HttpWorkerClient;
pub use types::{Credentials, StartTaskRequest, StatusSnapshot, TaskState};
