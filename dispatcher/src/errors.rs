//! Error types for the dispatcher

use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use thiserror::Error;
use webhook_models::models::DispatchResponse;

use crate::deploy::result::DeploymentStatus;

/// Process-level error type (startup, configuration, serving)
#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Shutdown error: {0}")]
    ShutdownError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Terminal outcome of a webhook delivery that did not end in a successful
/// deployment
///
/// Every variant is surfaced to the caller; none of them is retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Invalid signature")]
    AuthenticationFailure,

    #[error("Invalid payload: {0}")]
    MalformedInput(String),

    #[error("Repository not configured: {0}")]
    NotConfigured(String),

    #[error("Deployment already in progress for {0}")]
    Busy(String),

    #[error("{0}")]
    Ignored(String),

    #[error("Deployment failed at step '{step}': {detail}")]
    PipelineStepFailure {
        step: String,
        detail: String,
        stdout: String,
        stderr: String,
        steps: Vec<String>,
    },
}

impl DispatchError {
    /// HTTP status reported for this outcome
    pub fn status_code(&self) -> StatusCode {
        match self {
            DispatchError::AuthenticationFailure => StatusCode::UNAUTHORIZED,
            DispatchError::MalformedInput(_) | DispatchError::NotConfigured(_) => {
                StatusCode::BAD_REQUEST
            }
            DispatchError::Busy(_) | DispatchError::Ignored(_) => StatusCode::OK,
            DispatchError::PipelineStepFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable status label used in the response body
    pub fn status_label(&self) -> &'static str {
        match self {
            DispatchError::AuthenticationFailure => "unauthorized",
            DispatchError::MalformedInput(_) => "bad_request",
            DispatchError::NotConfigured(_) => "not_configured",
            DispatchError::Busy(_) => DeploymentStatus::Skipped.as_str(),
            DispatchError::Ignored(_) => "ignored",
            DispatchError::PipelineStepFailure { .. } => DeploymentStatus::Failure.as_str(),
        }
    }

    /// Whether this outcome is an expected no-op rather than a fault
    pub fn is_benign(&self) -> bool {
        matches!(self, DispatchError::Busy(_) | DispatchError::Ignored(_))
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();
        let label = self.status_label().to_string();

        let (detail, steps) = match self {
            DispatchError::PipelineStepFailure { stderr, steps, .. } => {
                let detail = if stderr.trim().is_empty() {
                    None
                } else {
                    Some(stderr)
                };
                (detail, steps)
            }
            _ => (None, Vec::new()),
        };

        let body = DispatchResponse {
            status: label,
            message,
            detail,
            steps,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            DispatchError::AuthenticationFailure.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            DispatchError::MalformedInput("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            DispatchError::NotConfigured("team/x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(DispatchError::Busy("team/x".into()).status_code(), StatusCode::OK);
        assert_eq!(DispatchError::Ignored("nope".into()).status_code(), StatusCode::OK);

        let failure = DispatchError::PipelineStepFailure {
            step: "build".into(),
            detail: "exit code 1".into(),
            stdout: String::new(),
            stderr: "boom".into(),
            steps: vec!["fetch".into(), "build".into()],
        };
        assert_eq!(failure.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(failure.status_label(), "failure");
        assert!(!failure.is_benign());
    }

    #[test]
    fn test_busy_message() {
        let err = DispatchError::Busy("team/api".into());
        assert_eq!(err.to_string(), "Deployment already in progress for team/api");
        assert!(err.is_benign());
    }
}
