//! Command handlers

use crate::brief::{ApplicationBrief, ContactBrief};
use crate::console::{self, ConsoleProgress};
use anyhow::Context;
use jobpilot_foundation::WorkerSettings;
use jobpilot_task::{
    ClassifyContext, Classifier, KeywordClassifier, Orchestrator, OutcomeStatus, RunRequest,
    StructuredOutcome, TaskKind,
};
use jobpilot_worker::{Credentials, HttpWorkerClient, StatusSnapshot, WorkerClient};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Process exit code for an outcome
pub fn exit_code(status: OutcomeStatus) -> i32 {
    match status {
        OutcomeStatus::Success => 0,
        OutcomeStatus::Partial => 2,
        OutcomeStatus::Failed => 1,
    }
}

fn client(settings: &WorkerSettings) -> anyhow::Result<Arc<dyn WorkerClient>> {
    let client = HttpWorkerClient::from_settings(settings)
        .with_context(|| format!("Cannot reach worker at {}", settings.effective_base_url()))?;
    Ok(Arc::new(client))
}

/// Run one task through the orchestrator, cancelling on Ctrl-C
async fn run_task(
    settings: &WorkerSettings,
    kind: TaskKind,
    request: RunRequest,
    json: bool,
) -> anyhow::Result<StructuredOutcome> {
    let orchestrator = Orchestrator::new(
        client(settings)?,
        Arc::new(KeywordClassifier::for_kind(kind)),
        settings.poll_interval(),
    );
    let request = match settings.api_key.as_deref() {
        Some(key) => request.with_credentials(Credentials::new(key)),
        None => request,
    };

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("Interrupted, stopping the task...");
            on_ctrl_c.cancel();
        }
    });

    tracing::info!(
        "Running {} task (deadline {}s)",
        kind,
        request.deadline.as_secs()
    );
    let outcome = orchestrator
        .run_with_cancel(&request, &ConsoleProgress, &cancel)
        .await;
    console::print_outcome(&outcome, json)?;
    Ok(outcome)
}

/// `jobpilot apply`
pub async fn apply(
    settings: &WorkerSettings,
    brief: ApplicationBrief,
    deadline: Option<u64>,
    json: bool,
) -> anyhow::Result<StructuredOutcome> {
    let deadline = deadline
        .map(Duration::from_secs)
        .unwrap_or_else(|| settings.apply_deadline());
    let request = RunRequest::new(brief.describe(), deadline)
        .with_context(ClassifyContext::new(&brief.title, &brief.company));
    run_task(settings, TaskKind::Application, request, json).await
}

/// `jobpilot contacts`
pub async fn contacts(
    settings: &WorkerSettings,
    brief: ContactBrief,
    deadline: Option<u64>,
    json: bool,
) -> anyhow::Result<StructuredOutcome> {
    let deadline = deadline
        .map(Duration::from_secs)
        .unwrap_or_else(|| settings.contacts_deadline());
    let title = brief.role.clone().unwrap_or_default();
    let request = RunRequest::new(brief.describe(), deadline)
        .with_context(ClassifyContext::new(title, &brief.company));
    run_task(settings, TaskKind::ContactSearch, request, json).await
}

/// `jobpilot status <task-id>`
pub async fn status(settings: &WorkerSettings, task_id: &str, json: bool) -> anyhow::Result<()> {
    let snapshot = client(settings)?.task_status(task_id).await?;

    if json {
        let value = match &snapshot {
            StatusSnapshot::Running => serde_json::json!({ "state": "running" }),
            StatusSnapshot::Completed(result) => {
                serde_json::json!({ "state": "completed", "result": result })
            }
            StatusSnapshot::Error(message) => {
                serde_json::json!({ "state": "error", "message": message })
            }
        };
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}: {}", task_id, snapshot.state());
    match snapshot {
        StatusSnapshot::Completed(Value::String(report)) => println!("\n{}", report),
        StatusSnapshot::Completed(other) => println!("\n{}", serde_json::to_string_pretty(&other)?),
        StatusSnapshot::Error(message) => println!("\n{}", message),
        StatusSnapshot::Running => {}
    }
    Ok(())
}

/// `jobpilot stop <task-id>`
pub async fn stop(settings: &WorkerSettings, task_id: &str) -> anyhow::Result<()> {
    client(settings)?.stop_task(task_id).await?;
    println!("Stop requested for {}", task_id);
    Ok(())
}

/// Read a saved report: JSON when it parses, plain text otherwise
pub fn read_report(path: &Path) -> anyhow::Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read report {}", path.display()))?;
    Ok(match serde_json::from_str::<Value>(&content) {
        Ok(value @ (Value::Object(_) | Value::Array(_))) => value,
        _ => Value::String(content),
    })
}

/// `jobpilot classify`
pub fn classify(
    kind: TaskKind,
    path: &Path,
    context: ClassifyContext,
    json: bool,
) -> anyhow::Result<StructuredOutcome> {
    let raw = read_report(path)?;
    let outcome = KeywordClassifier::for_kind(kind).classify(&raw, &context);
    console::print_outcome(&outcome, json)?;
    Ok(outcome)
}

/// `jobpilot config`
pub fn show_config(settings: &WorkerSettings, save_global: bool) -> anyhow::Result<()> {
    println!("Worker URL:       {}", settings.effective_base_url());
    println!(
        "API key:          {}",
        settings.masked_api_key().unwrap_or_else(|| "(not set)".to_string())
    );
    println!("Poll interval:    {}s", settings.poll_interval().as_secs());
    println!("Apply deadline:   {}s", settings.apply_deadline().as_secs());
    println!("Contacts deadline: {}s", settings.contacts_deadline().as_secs());
    println!("Request timeout:  {}s", settings.request_timeout().as_secs());

    if save_global {
        settings.save_global()?;
        println!("\n✓ Saved to global settings");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_report_text_and_json() {
        let mut text = tempfile::NamedTempFile::new().unwrap();
        write!(text, "Application submitted.\n1. Opened form").unwrap();
        assert_eq!(
            read_report(text.path()).unwrap(),
            Value::String("Application submitted.\n1. Opened form".into())
        );

        let mut obj = tempfile::NamedTempFile::new().unwrap();
        write!(obj, r#"{{"output": "Resume uploaded."}}"#).unwrap();
        assert_eq!(
            read_report(obj.path()).unwrap(),
            serde_json::json!({"output": "Resume uploaded."})
        );

        // a bare JSON scalar is still a text report
        let mut num = tempfile::NamedTempFile::new().unwrap();
        write!(num, "42").unwrap();
        assert_eq!(read_report(num.path()).unwrap(), Value::String("42".into()));
    }

    #[test]
    fn test_classify_file() {
        let mut report = tempfile::NamedTempFile::new().unwrap();
        write!(report, "Successfully submitted application").unwrap();
        let outcome = classify(
            TaskKind::Application,
            report.path(),
            ClassifyContext::new("SRE", "Initech"),
            true,
        )
        .unwrap();
        assert_eq!(outcome.status, OutcomeStatus::Success);
        assert_eq!(exit_code(outcome.status), 0);
    }

    #[test]
    fn test_missing_report_is_an_error() {
        let err = read_report(Path::new("/definitely/not/here.txt")).unwrap_err();
        assert!(err.to_string().contains("Failed to read report"));
    }
}
