//! Repository → project lookup

use std::collections::HashMap;

use thiserror::Error;

use crate::errors::AppError;
use crate::projects::config::ProjectConfig;

/// Lookup miss for a repository identifier
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("repository not configured: {0}")]
pub struct NotFound(pub String);

/// Read-only table of configured projects
///
/// Populated once at startup; there is deliberately no way to add or remove
/// entries afterwards.
#[derive(Debug, Default)]
pub struct ProjectRegistry {
    projects: HashMap<String, ProjectConfig>,
}

impl ProjectRegistry {
    /// Build the registry, rejecting duplicate or empty repository names.
    pub fn new(projects: impl IntoIterator<Item = ProjectConfig>) -> Result<Self, AppError> {
        let mut table = HashMap::new();
        for project in projects {
            if project.repository.trim().is_empty() {
                return Err(AppError::ConfigError(
                    "project with empty repository name".to_string(),
                ));
            }
            if project.process.trim().is_empty() {
                return Err(AppError::ConfigError(format!(
                    "project {} has no process name",
                    project.repository
                )));
            }
            let key = project.repository.clone();
            if table.insert(key.clone(), project).is_some() {
                return Err(AppError::ConfigError(format!(
                    "repository configured more than once: {}",
                    key
                )));
            }
        }
        Ok(Self { projects: table })
    }

    pub fn resolve(&self, repository: &str) -> Result<&ProjectConfig, NotFound> {
        self.projects
            .get(repository)
            .ok_or_else(|| NotFound(repository.to_string()))
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Configured repository names, sorted
    pub fn repositories(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.projects.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projects::config::ProjectFlavor;

    fn project(repo: &str) -> ProjectConfig {
        ProjectConfig::new(repo, format!("/srv/{repo}"), "svc", ProjectFlavor::Backend)
    }

    #[test]
    fn test_resolve() {
        let registry = ProjectRegistry::new([project("team/api"), project("team/web")]).unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.resolve("team/api").unwrap().repository, "team/api");
        assert_eq!(
            registry.resolve("team/unknown"),
            Err(NotFound("team/unknown".to_string()))
        );
        assert_eq!(registry.repositories(), ["team/api", "team/web"]);
    }

    #[test]
    fn test_duplicate_rejected() {
        let result = ProjectRegistry::new([project("team/api"), project("team/api")]);
        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }

    #[test]
    fn test_empty_process_rejected() {
        let mut p = project("team/api");
        p.process = " ".to_string();
        assert!(ProjectRegistry::new([p]).is_err());
    }
}
