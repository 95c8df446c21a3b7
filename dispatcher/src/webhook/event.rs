//! Parsed webhook deliveries

use std::collections::BTreeSet;

use axum::body::Bytes;
use webhook_models::models::WebhookPayload;

use crate::errors::DispatchError;

/// Kind of notification, derived from the event-key header
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Push,
    PullRequestMerged,
    Other(String),
}

impl EventKind {
    /// Map a provider event key onto a kind.
    ///
    /// Bitbucket sends `repo:push` and `pullrequest:fulfilled`; the bare
    /// `push` form is accepted as well.
    pub fn from_header(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("repo:push") | Some("push") => EventKind::Push,
            Some("pullrequest:fulfilled") => EventKind::PullRequestMerged,
            Some(other) => EventKind::Other(other.to_string()),
            None => EventKind::Other(String::new()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EventKind::Push => "push",
            EventKind::PullRequestMerged => "pull_request_merged",
            EventKind::Other(raw) => raw,
        }
    }
}

/// An authenticated, decoded webhook delivery
///
/// Built once from the raw body and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct DeploymentEvent {
    repository: String,
    kind: EventKind,
    target_branch: Option<String>,
    pushed_branches: Vec<String>,
    changed_files: BTreeSet<String>,
    raw_payload: Bytes,
}

impl DeploymentEvent {
    /// Decode a delivery.
    ///
    /// `raw_payload` must be the exact bytes received on the wire. Fails with
    /// [`DispatchError::MalformedInput`] when the body is not JSON, names no
    /// repository, or lacks the section its event kind requires.
    pub fn parse(kind: EventKind, raw_payload: Bytes) -> Result<Self, DispatchError> {
        let payload: WebhookPayload = serde_json::from_slice(&raw_payload)
            .map_err(|e| DispatchError::MalformedInput(e.to_string()))?;

        let repository = payload
            .repository
            .map(|r| r.full_name)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| DispatchError::MalformedInput("missing repository".to_string()))?;

        let mut pushed_branches = Vec::new();
        let mut changed_files = BTreeSet::new();
        let mut target_branch = None;

        match &kind {
            EventKind::Push => {
                let push = payload
                    .push
                    .ok_or_else(|| DispatchError::MalformedInput("missing push".to_string()))?;

                for change in push.changes {
                    if let Some(new) = change.new {
                        pushed_branches.push(new.name);
                    }
                    for commit in change.commits {
                        changed_files.extend(commit.files.into_iter().map(|f| f.path));
                    }
                }
                target_branch = pushed_branches.first().cloned();
            }
            EventKind::PullRequestMerged => {
                let pr = payload.pullrequest.ok_or_else(|| {
                    DispatchError::MalformedInput("missing pullrequest".to_string())
                })?;
                target_branch = Some(pr.destination.branch.name);
            }
            EventKind::Other(_) => {}
        }

        Ok(Self {
            repository,
            kind,
            target_branch,
            pushed_branches,
            changed_files,
            raw_payload,
        })
    }

    /// Owner-qualified repository name
    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    /// Destination branch of a merge, or first pushed branch of a push
    pub fn target_branch(&self) -> Option<&str> {
        self.target_branch.as_deref()
    }

    /// Names of every branch updated by a push, in payload order
    pub fn pushed_branches(&self) -> &[String] {
        &self.pushed_branches
    }

    /// Paths touched by any commit in the delivery
    pub fn changed_files(&self) -> &BTreeSet<String> {
        &self.changed_files
    }

    /// Whether `file` appears among the changed paths
    pub fn touches(&self, file: &str) -> bool {
        self.changed_files.contains(file)
    }

    pub fn raw_payload(&self) -> &Bytes {
        &self.raw_payload
    }
}
