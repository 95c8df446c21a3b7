//! Webhook dispatch
//!
//! verify → parse → classify → lock → pipeline → report. The first failing
//! stage decides the outcome; the lock is released on every path once taken.

use axum::body::Bytes;
use secrecy::{ExposeSecret, SecretString};
use tracing::{error, info, warn, Instrument};
use uuid::Uuid;

use crate::deploy::lock::LockTable;
use crate::deploy::pipeline::DeploymentPipeline;
use crate::deploy::result::DeploymentResult;
use crate::dispatch::classifier::{Decision, EventClassifier, IgnoreReason};
use crate::errors::DispatchError;
use crate::projects::ProjectRegistry;
use crate::webhook::{signature, DeploymentEvent, EventKind};

/// Header values the dispatcher needs from a delivery
#[derive(Debug, Clone, Default)]
pub struct DeliveryHeaders {
    pub signature: Option<String>,
    pub event_key: Option<String>,
}

/// Dispatcher settings
#[derive(Debug, Clone)]
pub struct DispatcherOptions {
    /// Branch whose updates deploy
    pub deployment_branch: String,
}

impl Default for DispatcherOptions {
    fn default() -> Self {
        Self {
            deployment_branch: "staging".to_string(),
        }
    }
}

/// Orchestrates one delivery end to end
pub struct Dispatcher {
    secret: SecretString,
    registry: ProjectRegistry,
    locks: LockTable,
    pipeline: DeploymentPipeline,
    options: DispatcherOptions,
}

impl Dispatcher {
    pub fn new(
        secret: SecretString,
        registry: ProjectRegistry,
        pipeline: DeploymentPipeline,
        options: DispatcherOptions,
    ) -> Self {
        Self {
            secret,
            registry,
            locks: LockTable::new(),
            pipeline,
            options,
        }
    }

    pub fn registry(&self) -> &ProjectRegistry {
        &self.registry
    }

    pub fn locks(&self) -> &LockTable {
        &self.locks
    }

    /// Handle a delivery. `body` must be the raw request bytes.
    pub async fn dispatch(
        &self,
        headers: DeliveryHeaders,
        body: Bytes,
    ) -> Result<DeploymentResult, DispatchError> {
        let delivery_id = Uuid::new_v4();
        let span = tracing::info_span!("delivery", id = %delivery_id);
        self.dispatch_inner(headers, body).instrument(span).await
    }

    async fn dispatch_inner(
        &self,
        headers: DeliveryHeaders,
        body: Bytes,
    ) -> Result<DeploymentResult, DispatchError> {
        // Signature first, over the untouched bytes
        let secret = self.secret.expose_secret().as_bytes();
        if !signature::verify(&body, headers.signature.as_deref(), secret) {
            warn!("Invalid signature received");
            return Err(DispatchError::AuthenticationFailure);
        }

        let kind = EventKind::from_header(headers.event_key.as_deref());
        let event = DeploymentEvent::parse(kind, body).inspect_err(|e| {
            warn!("Rejected payload: {}", e);
        })?;

        let classifier = EventClassifier::new(&self.registry, &self.options.deployment_branch);
        let (project, branch) = match classifier.classify(&event) {
            Decision::Deploy { project, branch } => (project, branch),
            Decision::Ignore(IgnoreReason::NotConfigured(repo)) => {
                info!("Repository not configured: {}", repo);
                return Err(DispatchError::NotConfigured(repo));
            }
            Decision::Ignore(reason) => {
                info!(
                    "Ignoring {} event for {}: {}",
                    event.kind().as_str(),
                    event.repository(),
                    reason
                );
                return Err(DispatchError::Ignored(reason.to_string()));
            }
        };

        let Some(_guard) = self.locks.acquire(&project.repository) else {
            info!(
                "Deployment already in progress for {}. Skipping.",
                project.repository
            );
            return Err(DispatchError::Busy(project.repository.clone()));
        };

        info!("Deploying {} to {}...", project.repository, branch);
        let result = self.pipeline.run(project, &event, &branch).await;

        match result.to_error() {
            None => {
                info!(
                    "Deployed {} successfully in {}ms",
                    project.repository,
                    result.duration().num_milliseconds()
                );
                Ok(result)
            }
            Some(err) => {
                error!("Deployment failed for {}: {}", project.repository, result.detail);
                Err(err)
            }
        }
    }
}
