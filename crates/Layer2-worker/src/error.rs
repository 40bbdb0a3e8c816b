//! Worker-specific error types
//!
//! WorkerError는 원격 자동화 워커와의 통신 에러를 관리합니다.
//! jobpilot_foundation::Error와의 변환을 지원합니다.

use jobpilot_foundation::Error as FoundationError;
use thiserror::Error;

/// Errors that can occur while talking to the automation worker
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkerError {
    /// Credentials rejected by the worker (401/403)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Unknown task or endpoint (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Server error (5xx)
    #[error("Server error ({status}): {body}")]
    ServerError { status: u16, body: String },

    /// Any other non-success status
    #[error("Request rejected ({status}): {body}")]
    Rejected { status: u16, body: String },

    /// Network error (connection refused, DNS, tunnel down, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// Response body could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Start call succeeded but carried no task identifier
    #[error("Worker response did not include a task id")]
    MissingTaskId,
}

impl WorkerError {
    /// Create from HTTP status code and body
    pub fn from_http_status(status: u16, body: &str) -> Self {
        let body = summarize_body(body);
        match status {
            401 | 403 => WorkerError::Authentication(body),
            404 => WorkerError::NotFound(body),
            500..=599 => WorkerError::ServerError { status, body },
            _ => WorkerError::Rejected { status, body },
        }
    }

    /// Transient errors may succeed when the same call is issued again
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            WorkerError::Network(_) | WorkerError::ServerError { .. }
        )
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            WorkerError::ServerError { status, .. } | WorkerError::Rejected { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

/// Error bodies from tunnels can be whole HTML pages; keep the first line, bounded.
fn summarize_body(body: &str) -> String {
    const MAX_LEN: usize = 200;
    let first_line = body.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("");
    if first_line.chars().count() > MAX_LEN {
        let truncated: String = first_line.chars().take(MAX_LEN).collect();
        format!("{}...", truncated)
    } else {
        first_line.to_string()
    }
}

// ============================================================================
// jobpilot_foundation::Error 변환
// ============================================================================

impl From<WorkerError> for FoundationError {
    fn from(err: WorkerError) -> Self {
        match err {
            WorkerError::Network(msg) => FoundationError::Http(format!("Network: {}", msg)),
            WorkerError::Authentication(msg) => {
                FoundationError::Config(format!("Worker rejected credentials: {}", msg))
            }
            other => FoundationError::Worker(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_http_status() {
        assert!(matches!(
            WorkerError::from_http_status(401, "bad key"),
            WorkerError::Authentication(_)
        ));
        assert!(matches!(
            WorkerError::from_http_status(404, "no such task"),
            WorkerError::NotFound(_)
        ));
        assert_eq!(
            WorkerError::from_http_status(500, "boom"),
            WorkerError::ServerError {
                status: 500,
                body: "boom".to_string()
            }
        );
        assert_eq!(
            WorkerError::from_http_status(422, "task is required").status(),
            Some(422)
        );
    }

    #[test]
    fn test_transient_classification() {
        assert!(WorkerError::Network("refused".into()).is_transient());
        assert!(WorkerError::from_http_status(502, "bad gateway").is_transient());
        assert!(!WorkerError::from_http_status(400, "bad").is_transient());
        assert!(!WorkerError::MissingTaskId.is_transient());
    }

    #[test]
    fn test_body_is_summarized() {
        let html = format!("\n\n<html>{}</html>\n<body>ignored</body>", "x".repeat(500));
        let err = WorkerError::from_http_status(502, &html);
        let WorkerError::ServerError { body, .. } = err else {
            panic!("expected server error");
        };
        assert!(body.starts_with("<html>"));
        assert!(body.ends_with("..."));
        assert!(!body.contains("ignored"));
    }

    #[test]
    fn test_into_foundation_error() {
        let err: FoundationError = WorkerError::Network("tunnel offline".into()).into();
        assert!(matches!(err, FoundationError::Http(_)));

        let err: FoundationError = WorkerError::MissingTaskId.into();
        assert!(matches!(err, FoundationError::Worker(_)));
    }
}
