//! Result Classifier - turns a free-text worker report into a structured outcome
//!
//! The worker answers in prose. [`KeywordClassifier`] scans it against the
//! keyword tables of a [`ClassifierProfile`]:
//!
//! 1. normalize the payload to text
//! 2. case-insensitive scan of success / partial / flag / obstacle indicators
//! 3. decide the status (success > partial or any flag > failed)
//! 4. pull obstacle sentences and steps out of the text
//! 5. render the one-line message from the task context
//!
//! Classification never fails: unreadable input yields [`StructuredOutcome::unreadable`].

pub mod extract;
pub mod profile;

pub use profile::{ClassifierProfile, Flag, FlagRule, MessageTemplates};

use crate::task::TaskKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// Placeholder used when a report has no usable step lines
pub const NO_STEPS_PLACEHOLDER: &str = "Worker did not report individual steps";

/// Overall verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Success,
    Partial,
    Failed,
}

impl OutcomeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeStatus::Success => "success",
            OutcomeStatus::Partial => "partial",
            OutcomeStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A person found by a contact search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub profile_url: String,
}

/// Classified result of one task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredOutcome {
    pub status: OutcomeStatus,
    pub message: String,
    /// Raw report, verbatim
    pub details: String,
    /// Never empty
    pub steps: Vec<String>,
    pub obstacles: Vec<String>,
    #[serde(default)]
    pub resume_submitted: bool,
    #[serde(default)]
    pub forms_filled: bool,
    #[serde(default)]
    pub profiles_reviewed: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contacts: Vec<Contact>,
}

impl StructuredOutcome {
    /// Failed outcome for a run that never produced a report
    pub fn failed(message: impl Into<String>, details: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            status: OutcomeStatus::Failed,
            details: details.into(),
            steps: vec!["Task ended before the worker produced a report".to_string()],
            obstacles: vec![message.clone()],
            message,
            resume_submitted: false,
            forms_filled: false,
            profiles_reviewed: false,
            contacts: Vec::new(),
        }
    }

    /// Fallback when the report itself could not be analyzed
    pub fn unreadable(reason: &ClassifyError, details: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Failed,
            message: "Could not interpret the worker report".to_string(),
            details: details.into(),
            steps: vec!["Worker report could not be analyzed".to_string()],
            obstacles: vec![reason.to_string()],
            resume_submitted: false,
            forms_filled: false,
            profiles_reviewed: false,
            contacts: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }

    pub fn flag(&self, flag: Flag) -> bool {
        match flag {
            Flag::ResumeSubmitted => self.resume_submitted,
            Flag::FormsFilled => self.forms_filled,
            Flag::ProfilesReviewed => self.profiles_reviewed,
        }
    }

    fn set_flag(&mut self, flag: Flag) {
        match flag {
            Flag::ResumeSubmitted => self.resume_submitted = true,
            Flag::FormsFilled => self.forms_filled = true,
            Flag::ProfilesReviewed => self.profiles_reviewed = true,
        }
    }
}

/// Labels used only for message text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifyContext {
    /// Job title (applications) or searched role (contacts)
    pub title: String,
    /// Company name
    pub target: String,
}

impl ClassifyContext {
    pub fn new(title: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            target: target.into(),
        }
    }

    fn render(&self, template: &str) -> String {
        let title = non_empty_or(&self.title, "the position");
        let target = non_empty_or(&self.target, "the company");
        template.replace("{title}", title).replace("{target}", target)
    }
}

fn non_empty_or<'a>(value: &'a str, default: &'a str) -> &'a str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        default
    } else {
        trimmed
    }
}

/// Reasons a report could not be analyzed. Never returned from `classify`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassifyError {
    #[error("Worker returned an empty report")]
    EmptyReport,

    #[error("Worker report could not be read: {0}")]
    Unreadable(String),
}

/// Derives a structured verdict from a raw terminal payload
pub trait Classifier: Send + Sync {
    /// Pure function of `raw` and the classifier's tables. Never fails.
    fn classify(&self, raw: &Value, context: &ClassifyContext) -> StructuredOutcome;
}

/// Keyword-table classifier
#[derive(Debug, Clone, Copy)]
pub struct KeywordClassifier {
    profile: &'static ClassifierProfile,
}

impl KeywordClassifier {
    pub fn new(profile: &'static ClassifierProfile) -> Self {
        Self { profile }
    }

    pub fn for_kind(kind: TaskKind) -> Self {
        Self::new(ClassifierProfile::for_kind(kind))
    }

    pub fn profile(&self) -> &'static ClassifierProfile {
        self.profile
    }

    /// Fallible core of [`Classifier::classify`]
    pub fn try_classify(
        &self,
        raw: &Value,
        context: &ClassifyContext,
    ) -> Result<StructuredOutcome, ClassifyError> {
        let text = extract::normalize(raw)?;
        let lowered = text.to_lowercase();
        let profile = self.profile;

        let hit = |indicators: &[&str]| indicators.iter().any(|i| lowered.contains(i));

        let mut outcome = StructuredOutcome {
            status: OutcomeStatus::Failed,
            message: String::new(),
            details: extract::raw_to_string(raw),
            steps: Vec::new(),
            obstacles: Vec::new(),
            resume_submitted: false,
            forms_filled: false,
            profiles_reviewed: false,
            contacts: Vec::new(),
        };

        for rule in profile.flags {
            if hit(rule.indicators) {
                outcome.set_flag(rule.flag);
            }
        }

        if profile.extract_contacts {
            outcome.contacts = extract::contacts(&text)?;
        }

        let any_flag = profile.flags.iter().any(|rule| outcome.flag(rule.flag));
        outcome.status = if hit(profile.success) {
            OutcomeStatus::Success
        } else if hit(profile.partial) || any_flag || !outcome.contacts.is_empty() {
            OutcomeStatus::Partial
        } else {
            OutcomeStatus::Failed
        };

        for indicator in profile.obstacles.iter().filter(|i| lowered.contains(**i)) {
            let obstacle = match extract::sentence_containing(&text, indicator)? {
                Some(sentence) => sentence.to_string(),
                None => format!("Encountered obstacle: {}", indicator),
            };
            if !outcome.obstacles.contains(&obstacle) {
                outcome.obstacles.push(obstacle);
            }
        }

        outcome.steps = extract::steps(&text)?;
        if outcome.steps.is_empty() {
            outcome.steps.push(NO_STEPS_PLACEHOLDER.to_string());
        }

        let template = match outcome.status {
            OutcomeStatus::Success => profile.templates.success,
            OutcomeStatus::Partial => profile.templates.partial,
            OutcomeStatus::Failed => profile.templates.failed,
        };
        outcome.message = context.render(template);

        Ok(outcome)
    }
}

impl Classifier for KeywordClassifier {
    fn classify(&self, raw: &Value, context: &ClassifyContext) -> StructuredOutcome {
        match self.try_classify(raw, context) {
            Ok(outcome) => {
                debug!(
                    "Classified {} report as {} ({} steps, {} obstacles)",
                    self.profile.kind,
                    outcome.status,
                    outcome.steps.len(),
                    outcome.obstacles.len()
                );
                outcome
            }
            Err(e) => {
                warn!("Falling back to failed outcome: {}", e);
                StructuredOutcome::unreadable(&e, extract::raw_to_string(raw))
            }
        }
    }
}
