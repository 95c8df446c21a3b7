//! Settings file management

use std::path::PathBuf;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::logs::LogLevel;
use crate::projects::ProjectConfig;

/// Environment variable holding the shared webhook secret
pub const SECRET_ENV_VAR: &str = "WEBHOOK_SECRET";

/// Dispatcher settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Directory for `webhook.log`; file logging is off when unset
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Emit JSON log lines
    #[serde(default)]
    pub json_logs: bool,

    /// HTTP listener
    #[serde(default)]
    pub server: ServerSettings,

    /// Shared secret; `WEBHOOK_SECRET` takes precedence
    #[serde(default, skip_serializing)]
    pub secret: Option<String>,

    /// Branch whose updates deploy
    #[serde(default = "default_deployment_branch")]
    pub deployment_branch: String,

    /// Dependency manifest whose change triggers an install
    #[serde(default = "default_manifest_file")]
    pub manifest_file: String,

    /// Remote pulled from
    #[serde(default = "default_remote")]
    pub remote: String,

    /// Upper bound for a single pipeline step
    #[serde(default)]
    pub step_timeout_secs: Option<u64>,

    /// Log pipeline commands instead of running them
    #[serde(default)]
    pub dry_run: bool,

    /// Deployment targets
    #[serde(default)]
    pub projects: Vec<ProjectConfig>,
}

fn default_deployment_branch() -> String {
    "staging".to_string()
}

fn default_manifest_file() -> String {
    "package.json".to_string()
}

fn default_remote() -> String {
    "origin".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            log_dir: None,
            json_logs: false,
            server: ServerSettings::default(),
            secret: None,
            deployment_branch: default_deployment_branch(),
            manifest_file: default_manifest_file(),
            remote: default_remote(),
            step_timeout_secs: None,
            dry_run: false,
            projects: Vec::new(),
        }
    }
}

impl Settings {
    /// Resolve the shared secret from `env_value` (normally `WEBHOOK_SECRET`)
    /// or the settings file.
    ///
    /// There is no fallback: a missing or blank secret is a configuration
    /// error, so the process refuses to start.
    pub fn resolve_secret(&self, env_value: Option<String>) -> Result<SecretString, AppError> {
        let secret = env_value
            .filter(|s| !s.trim().is_empty())
            .or_else(|| self.secret.clone().filter(|s| !s.trim().is_empty()))
            .ok_or_else(|| {
                AppError::ConfigError(format!(
                    "no webhook secret configured; set {} or `secret` in the settings file",
                    SECRET_ENV_VAR
                ))
            })?;
        Ok(SecretString::from(secret))
    }

    /// Sanity checks beyond what deserialization enforces
    pub fn validate(&self) -> Result<(), AppError> {
        if self.deployment_branch.trim().is_empty() {
            return Err(AppError::ConfigError("deployment_branch is empty".to_string()));
        }
        if self.manifest_file.trim().is_empty() {
            return Err(AppError::ConfigError("manifest_file is empty".to_string()));
        }
        if self.step_timeout_secs == Some(0) {
            return Err(AppError::ConfigError(
                "step_timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    9898
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}
