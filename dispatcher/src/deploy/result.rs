//! Deployment outcomes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::DispatchError;

/// Pipeline step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStep {
    Fetch,
    Install,
    Build,
    Restart,
}

impl PipelineStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStep::Fetch => "fetch",
            PipelineStep::Install => "install",
            PipelineStep::Build => "build",
            PipelineStep::Restart => "restart",
        }
    }
}

impl std::fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deployment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentStatus {
    Success,
    Failure,
    Skipped,
}

impl DeploymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentStatus::Success => "success",
            DeploymentStatus::Failure => "failure",
            DeploymentStatus::Skipped => "skipped",
        }
    }
}

/// Outcome of one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentResult {
    pub repository: String,
    pub status: DeploymentStatus,
    pub detail: String,

    /// Steps started, in order (the failing one included)
    pub steps: Vec<PipelineStep>,

    pub failed_step: Option<PipelineStep>,

    /// Output of the failing step
    pub stdout: String,
    pub stderr: String,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl DeploymentResult {
    pub fn is_success(&self) -> bool {
        self.status == DeploymentStatus::Success
    }

    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    /// Step names, for reporting
    pub fn step_names(&self) -> Vec<String> {
        self.steps.iter().map(|s| s.as_str().to_string()).collect()
    }

    /// Convert a failed run into the dispatcher's error taxonomy.
    ///
    /// Successful and skipped results yield `None`.
    pub fn to_error(&self) -> Option<DispatchError> {
        if self.status != DeploymentStatus::Failure {
            return None;
        }
        Some(DispatchError::PipelineStepFailure {
            step: self
                .failed_step
                .map(|s| s.as_str().to_string())
                .unwrap_or_default(),
            detail: self.detail.clone(),
            stdout: self.stdout.clone(),
            stderr: self.stderr.clone(),
            steps: self.step_names(),
        })
    }
}
