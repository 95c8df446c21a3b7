//! Application state management

use std::sync::Arc;

use secrecy::SecretString;
use tracing::{info, warn};

use crate::app::options::AppOptions;
use crate::deploy::pipeline::DeploymentPipeline;
use crate::deploy::recording::DryRunRunner;
use crate::deploy::runner::{CommandRunner, ProcessRunner};
use crate::dispatch::Dispatcher;
use crate::errors::AppError;
use crate::projects::{ProjectConfig, ProjectRegistry};

/// Main application state
pub struct AppState {
    /// Webhook dispatcher
    pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
    /// Initialize application state
    pub fn init(
        options: &AppOptions,
        secret: SecretString,
        projects: Vec<ProjectConfig>,
    ) -> Result<Self, AppError> {
        info!("Initializing application state...");

        let registry = ProjectRegistry::new(projects)?;
        if registry.is_empty() {
            warn!("No projects configured; every delivery will be rejected");
        }
        for repository in registry.repositories() {
            info!("Configured project: {}", repository);
        }

        let runner: Arc<dyn CommandRunner> = if options.dry_run {
            warn!("Dry run enabled; pipeline commands are logged, not executed");
            Arc::new(DryRunRunner::new())
        } else {
            Arc::new(ProcessRunner::new(options.step_timeout))
        };

        let pipeline = DeploymentPipeline::new(runner, options.pipeline.clone());
        let dispatcher = Dispatcher::new(secret, registry, pipeline, options.dispatcher.clone());

        Ok(Self {
            dispatcher: Arc::new(dispatcher),
        })
    }
}
