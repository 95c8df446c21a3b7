//! Webhook payload and response models

use serde::{Deserialize, Serialize};

// ================================= INBOUND ==================================== //

/// Top-level webhook body
///
/// Only the fields the dispatcher reads are modelled; everything else in the
/// provider's payload is ignored during decoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub repository: Option<Repository>,

    /// Present on push events
    #[serde(default)]
    pub push: Option<Push>,

    /// Present on pull request events
    #[serde(default)]
    pub pullrequest: Option<PullRequest>,
}

/// Repository the event originated from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    /// Owner-qualified name, e.g. `team/service`
    pub full_name: String,
}

/// Push body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Push {
    #[serde(default)]
    pub changes: Vec<RefChange>,
}

/// A single ref update within a push
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefChange {
    /// New state of the ref; absent when the ref was deleted
    #[serde(default)]
    pub new: Option<RefState>,

    #[serde(default)]
    pub commits: Vec<Commit>,
}

/// Ref name and kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefState {
    pub name: String,

    #[serde(rename = "type", default)]
    pub ref_type: Option<String>,
}

/// Commit summary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Commit {
    #[serde(default)]
    pub hash: Option<String>,

    /// Touched files; only populated by some providers/configurations
    #[serde(default)]
    pub files: Vec<CommitFile>,
}

/// File touched by a commit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitFile {
    pub path: String,
}

/// Pull request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    pub destination: PullRequestEndpoint,

    #[serde(default)]
    pub state: Option<String>,
}

/// Source or destination side of a pull request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestEndpoint {
    pub branch: BranchRef,
}

/// Branch reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchRef {
    pub name: String,
}

// ================================= OUTBOUND =================================== //

/// Health response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Version response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionResponse {
    pub version: String,
    pub git_hash: String,
    pub build_time: String,
}

/// Body returned by the webhook endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchResponse {
    /// `success`, `failure`, `skipped`, `ignored`, `unauthorized`,
    /// `bad_request` or `not_configured`
    pub status: String,

    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// Pipeline steps that ran, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_push_payload() {
        let body = r#"{
            "repository": {"full_name": "team/api", "uuid": "{abc}"},
            "push": {"changes": [
                {"new": {"name": "staging", "type": "branch"},
                 "commits": [{"hash": "a1", "files": [{"path": "package.json"}]}]}
            ]}
        }"#;

        let payload: WebhookPayload = serde_json::from_str(body).unwrap();
        assert_eq!(payload.repository.unwrap().full_name, "team/api");

        let push = payload.push.unwrap();
        assert_eq!(push.changes.len(), 1);
        assert_eq!(push.changes[0].new.as_ref().unwrap().name, "staging");
        assert_eq!(push.changes[0].commits[0].files[0].path, "package.json");
    }

    #[test]
    fn test_decode_deleted_ref() {
        let body = r#"{"repository": {"full_name": "team/api"},
                       "push": {"changes": [{"new": null, "commits": []}]}}"#;

        let payload: WebhookPayload = serde_json::from_str(body).unwrap();
        assert!(payload.push.unwrap().changes[0].new.is_none());
    }

    #[test]
    fn test_decode_pull_request_payload() {
        let body = r#"{
            "repository": {"full_name": "team/web"},
            "pullrequest": {"state": "MERGED",
                            "destination": {"branch": {"name": "staging"}}}
        }"#;

        let payload: WebhookPayload = serde_json::from_str(body).unwrap();
        assert!(payload.push.is_none());
        assert_eq!(payload.pullrequest.unwrap().destination.branch.name, "staging");
    }

    #[test]
    fn test_dispatch_response_omits_empty_fields() {
        let response = DispatchResponse {
            status: "ignored".to_string(),
            message: "No staging branch changes detected".to_string(),
            detail: None,
            steps: vec![],
        };

        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("detail").is_none());
        assert!(json.get("steps").is_none());
    }
}
