//! Terminal rendering: progress lines on stderr, outcomes on stdout

use jobpilot_task::{OutcomeStatus, ProgressObserver, ProgressUpdate, StructuredOutcome};
use std::fmt::Write as _;

/// Prints one stderr line per progress update
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleProgress;

impl ProgressObserver for ConsoleProgress {
    fn on_update(&self, update: ProgressUpdate) {
        eprintln!("{}", progress_line(&update));
    }
}

/// `[ 42%] polling     12s  Waiting for worker (attempt 3, 12s elapsed)`
pub fn progress_line(update: &ProgressUpdate) -> String {
    format!(
        "[{:>3}%] {:<10} {:>4}s  {}",
        update.progress_percent,
        update.status.display_name(),
        update.elapsed_seconds,
        update.message.as_deref().unwrap_or("")
    )
    .trim_end()
    .to_string()
}

/// Human-readable outcome
pub fn render_outcome(outcome: &StructuredOutcome) -> String {
    let mut out = String::new();
    let icon = match outcome.status {
        OutcomeStatus::Success => "✓",
        OutcomeStatus::Partial => "◐",
        OutcomeStatus::Failed => "✗",
    };
    let _ = writeln!(
        out,
        "{} {}  {}",
        icon,
        outcome.status.as_str().to_uppercase(),
        outcome.message
    );

    let _ = writeln!(out, "\nSteps:");
    for (i, step) in outcome.steps.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", i + 1, step);
    }

    if !outcome.obstacles.is_empty() {
        let _ = writeln!(out, "\nObstacles:");
        for obstacle in &outcome.obstacles {
            let _ = writeln!(out, "  - {}", obstacle);
        }
    }

    if !outcome.contacts.is_empty() {
        let _ = writeln!(out, "\nContacts:");
        for contact in &outcome.contacts {
            match &contact.title {
                Some(title) => {
                    let _ = writeln!(out, "  - {} ({})  {}", contact.name, title, contact.profile_url);
                }
                None => {
                    let _ = writeln!(out, "  - {}  {}", contact.name, contact.profile_url);
                }
            }
        }
    }

    let flags = [
        ("resume submitted", outcome.resume_submitted),
        ("forms filled", outcome.forms_filled),
        ("profiles reviewed", outcome.profiles_reviewed),
    ];
    let set: Vec<&str> = flags.iter().filter(|(_, on)| *on).map(|(name, _)| *name).collect();
    if !set.is_empty() {
        let _ = writeln!(out, "\nFlags: {}", set.join(", "));
    }

    out
}

/// Print to stdout, as JSON when asked
pub fn print_outcome(outcome: &StructuredOutcome, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
    } else {
        print!("{}", render_outcome(outcome));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobpilot_task::{ClassifyContext, Classifier, KeywordClassifier, ProgressStatus, TaskKind};
    use serde_json::json;

    #[test]
    fn test_progress_line() {
        let update = ProgressUpdate {
            status: ProgressStatus::Polling,
            progress_percent: 7,
            elapsed_seconds: 12,
            message: Some("Waiting for worker".into()),
            task_id: Some("task-1".into()),
            emitted_at: chrono::Utc::now(),
        };
        assert_eq!(progress_line(&update), "[  7%] polling      12s  Waiting for worker");
    }

    #[test]
    fn test_render_outcome() {
        let outcome = KeywordClassifier::for_kind(TaskKind::Application).classify(
            &json!("Resume uploaded. Captcha appeared.\n1. Opened form 2. Uploaded resume"),
            &ClassifyContext::new("SRE", "Initech"),
        );
        let text = render_outcome(&outcome);
        assert!(text.starts_with("◐ PARTIAL  Partially completed application for SRE at Initech"));
        assert!(text.contains("  1. Opened form"));
        assert!(text.contains("Obstacles:\n  - Captcha appeared."));
        assert!(text.contains("Flags: resume submitted"));
        assert!(!text.contains("Contacts:"));
    }
}
