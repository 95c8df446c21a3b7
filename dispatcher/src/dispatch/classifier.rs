//! Deploy / ignore decisions

use std::fmt;

use crate::projects::{ProjectConfig, ProjectRegistry};
use crate::webhook::{DeploymentEvent, EventKind};

/// Why an event does not trigger a deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Repository has no configured project
    NotConfigured(String),

    /// Push without any update to the deployment branch
    NoDeploymentBranchChange,

    /// Merge into some other branch
    BranchMismatch(String),

    /// Event kind the dispatcher does not act on
    UnsupportedEvent(String),
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IgnoreReason::NotConfigured(repo) => write!(f, "Repository not configured: {}", repo),
            IgnoreReason::NoDeploymentBranchChange => {
                write!(f, "No deployment branch changes detected")
            }
            IgnoreReason::BranchMismatch(branch) => {
                write!(f, "Merge into '{}' does not target the deployment branch", branch)
            }
            IgnoreReason::UnsupportedEvent(kind) => write!(f, "Unsupported event: {}", kind),
        }
    }
}

/// Classification result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision<'a> {
    Deploy {
        project: &'a ProjectConfig,
        branch: String,
    },
    Ignore(IgnoreReason),
}

impl Decision<'_> {
    pub fn is_deploy(&self) -> bool {
        matches!(self, Decision::Deploy { .. })
    }
}

/// Decides whether an event deploys, and what
pub struct EventClassifier<'a> {
    registry: &'a ProjectRegistry,
    deployment_branch: &'a str,
}

impl<'a> EventClassifier<'a> {
    pub fn new(registry: &'a ProjectRegistry, deployment_branch: &'a str) -> Self {
        Self {
            registry,
            deployment_branch,
        }
    }

    /// Pure function of the event and the static configuration.
    ///
    /// An unknown repository is reported before any branch check.
    pub fn classify(&self, event: &DeploymentEvent) -> Decision<'a> {
        let project = match self.registry.resolve(event.repository()) {
            Ok(project) => project,
            Err(not_found) => return Decision::Ignore(IgnoreReason::NotConfigured(not_found.0)),
        };

        match event.kind() {
            EventKind::Push => {
                let touches_branch = event
                    .pushed_branches()
                    .iter()
                    .any(|name| name == self.deployment_branch);
                if touches_branch {
                    Decision::Deploy {
                        project,
                        branch: self.deployment_branch.to_string(),
                    }
                } else {
                    Decision::Ignore(IgnoreReason::NoDeploymentBranchChange)
                }
            }
            EventKind::PullRequestMerged => match event.target_branch() {
                Some(branch) if branch == self.deployment_branch => Decision::Deploy {
                    project,
                    branch: branch.to_string(),
                },
                other => Decision::Ignore(IgnoreReason::BranchMismatch(
                    other.unwrap_or_default().to_string(),
                )),
            },
            EventKind::Other(kind) => Decision::Ignore(IgnoreReason::UnsupportedEvent(kind.clone())),
        }
    }
}
