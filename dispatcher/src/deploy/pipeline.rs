//! Staging deployment pipeline
//!
//! fetch → (install →) build → restart, stopping at the first failing step.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info};

use crate::deploy::result::{DeploymentResult, DeploymentStatus, PipelineStep};
use crate::deploy::runner::{CommandOutput, CommandRunner, CommandSpec};
use crate::projects::ProjectConfig;
use crate::webhook::DeploymentEvent;

/// Pipeline settings
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Dependency manifest whose change triggers an install
    pub manifest_file: String,

    /// Remote fetched from
    pub remote: String,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            manifest_file: "package.json".to_string(),
            remote: "origin".to_string(),
        }
    }
}

struct StepFailure {
    step: PipelineStep,
    detail: String,
    output: CommandOutput,
}

/// Runs the deployment steps for one project
pub struct DeploymentPipeline {
    runner: Arc<dyn CommandRunner>,
    options: PipelineOptions,
}

impl DeploymentPipeline {
    pub fn new(runner: Arc<dyn CommandRunner>, options: PipelineOptions) -> Self {
        Self { runner, options }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Steps that would run for `event`, in order
    pub fn plan(&self, event: &DeploymentEvent) -> Vec<PipelineStep> {
        if event.touches(&self.options.manifest_file) {
            vec![
                PipelineStep::Fetch,
                PipelineStep::Install,
                PipelineStep::Build,
                PipelineStep::Restart,
            ]
        } else {
            vec![PipelineStep::Fetch, PipelineStep::Build, PipelineStep::Restart]
        }
    }

    fn command_for(
        &self,
        step: PipelineStep,
        project: &ProjectConfig,
        branch: &str,
    ) -> Option<CommandSpec> {
        let argv = match step {
            PipelineStep::Fetch => vec![
                "git".to_string(),
                "pull".to_string(),
                self.options.remote.clone(),
                branch.to_string(),
            ],
            PipelineStep::Install => project.install_args(),
            PipelineStep::Build => project.build_args(),
            PipelineStep::Restart => vec![
                "pm2".to_string(),
                "restart".to_string(),
                project.process.clone(),
            ],
        };
        CommandSpec::from_argv(&argv, &project.path)
    }

    async fn run_step(
        &self,
        step: PipelineStep,
        project: &ProjectConfig,
        branch: &str,
    ) -> Result<(), StepFailure> {
        let Some(spec) = self.command_for(step, project, branch) else {
            return Err(StepFailure {
                step,
                detail: format!("empty {} command", step),
                output: CommandOutput::default(),
            });
        };

        info!("[{}] {}: {}", project.repository, step, spec.display());

        match self.runner.run(&spec).await {
            Ok(output) if output.success() => Ok(()),
            Ok(output) => {
                let code = output
                    .exit_code
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "signal".to_string());
                Err(StepFailure {
                    step,
                    detail: format!("`{}` exited with {}", spec.display(), code),
                    output,
                })
            }
            Err(e) => Err(StepFailure {
                step,
                detail: format!("`{}` could not run: {}", spec.display(), e),
                output: CommandOutput {
                    stderr: e.to_string(),
                    ..Default::default()
                },
            }),
        }
    }

    /// Deploy `project` at `branch`. Never retries.
    pub async fn run(
        &self,
        project: &ProjectConfig,
        event: &DeploymentEvent,
        branch: &str,
    ) -> DeploymentResult {
        let started_at = Utc::now();
        let plan = self.plan(event);

        if plan.contains(&PipelineStep::Install) {
            info!(
                "[{}] {} changed, installing dependencies before build",
                project.repository, self.options.manifest_file
            );
        } else {
            info!(
                "[{}] {} unchanged, skipping install",
                project.repository, self.options.manifest_file
            );
        }

        let mut executed = Vec::with_capacity(plan.len());
        for step in plan {
            executed.push(step);
            if let Err(failure) = self.run_step(step, project, branch).await {
                error!("[{}] {}", project.repository, failure.detail);
                return DeploymentResult {
                    repository: project.repository.clone(),
                    status: DeploymentStatus::Failure,
                    detail: failure.detail,
                    steps: executed,
                    failed_step: Some(failure.step),
                    stdout: failure.output.stdout,
                    stderr: failure.output.stderr,
                    started_at,
                    finished_at: Utc::now(),
                };
            }
        }

        DeploymentResult {
            repository: project.repository.clone(),
            status: DeploymentStatus::Success,
            detail: format!("Deployed {} ({})", branch, project.flavor.as_str()),
            steps: executed,
            failed_step: None,
            stdout: String::new(),
            stderr: String::new(),
            started_at,
            finished_at: Utc::now(),
        }
    }
}
