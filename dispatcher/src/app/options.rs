//! Application configuration options

use std::time::Duration;

use crate::deploy::pipeline::PipelineOptions;
use crate::dispatch::DispatcherOptions;
use crate::storage::settings::Settings;

/// Main application options
#[derive(Debug, Clone, Default)]
pub struct AppOptions {
    /// Server configuration
    pub server: ServerOptions,

    /// Classification settings
    pub dispatcher: DispatcherOptions,

    /// Pipeline settings
    pub pipeline: PipelineOptions,

    /// Upper bound for one pipeline step; unbounded when `None`
    pub step_timeout: Option<Duration>,

    /// Log pipeline commands instead of running them
    pub dry_run: bool,
}

impl AppOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            server: ServerOptions {
                host: settings.server.host.clone(),
                port: settings.server.port,
            },
            dispatcher: DispatcherOptions {
                deployment_branch: settings.deployment_branch.clone(),
            },
            pipeline: PipelineOptions {
                manifest_file: settings.manifest_file.clone(),
                remote: settings.remote.clone(),
            },
            step_timeout: settings.step_timeout_secs.map(Duration::from_secs),
            dry_run: settings.dry_run,
        }
    }
}

/// HTTP server options
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 9898,
        }
    }
}
