//! Per-project deployment target

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Kind of project behind a repository
///
/// Both flavors run the same default steps and the flavor is carried into
/// deployment results and logs. A project whose install or build differs sets
/// `install_command` / `build_command` instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectFlavor {
    #[default]
    Backend,
    Frontend,
}

impl ProjectFlavor {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectFlavor::Backend => "backend",
            ProjectFlavor::Frontend => "frontend",
        }
    }
}

/// Deployment target for one repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Owner-qualified repository name, e.g. `team/api`
    pub repository: String,

    /// Checkout the pipeline runs in
    pub path: PathBuf,

    /// pm2 process to restart
    pub process: String,

    /// Reporting label; does not change the default commands
    #[serde(default)]
    pub flavor: ProjectFlavor,

    /// Replaces `npm ci` when set
    #[serde(default)]
    pub install_command: Option<Vec<String>>,

    /// Replaces `npm run build` when set
    #[serde(default)]
    pub build_command: Option<Vec<String>>,
}

impl ProjectConfig {
    pub fn new(
        repository: impl Into<String>,
        path: impl Into<PathBuf>,
        process: impl Into<String>,
        flavor: ProjectFlavor,
    ) -> Self {
        Self {
            repository: repository.into(),
            path: path.into(),
            process: process.into(),
            flavor,
            install_command: None,
            build_command: None,
        }
    }

    /// Dependency install command line
    pub fn install_args(&self) -> Vec<String> {
        self.install_command
            .clone()
            .unwrap_or_else(|| vec!["npm".to_string(), "ci".to_string()])
    }

    /// Build command line
    pub fn build_args(&self) -> Vec<String> {
        self.build_command.clone().unwrap_or_else(|| {
            vec!["npm".to_string(), "run".to_string(), "build".to_string()]
        })
    }
}
