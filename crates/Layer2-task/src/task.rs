//! Task definition and types

use serde::{Deserialize, Serialize};

/// Identifies one in-flight remote job.
///
/// The id is assigned by the worker at launch and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskHandle {
    id: String,
}

impl TaskHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl std::fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.id)
    }
}

/// The two kinds of automation work the dashboard delegates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Fill out and submit a job application
    Application,

    /// Find HR / recruiting contacts on a professional network
    ContactSearch,
}

impl TaskKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            TaskKind::Application => "job application",
            TaskKind::ContactSearch => "contact search",
        }
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}
