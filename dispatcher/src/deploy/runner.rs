//! External command execution

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

/// A single external command invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub current_dir: PathBuf,
}

impl CommandSpec {
    /// Build a spec from a full command line (`program` followed by args).
    ///
    /// Returns `None` for an empty command line.
    pub fn from_argv(argv: &[String], current_dir: impl Into<PathBuf>) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
            current_dir: current_dir.into(),
        })
    }

    /// Command line as a single display string
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Captured result of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs external commands for the deployment pipeline
///
/// The pipeline only ever talks to this trait, so tests substitute a fake and
/// never touch a real shell.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run to completion. `Err` means the command could not be run at all
    /// (missing binary, missing directory, timeout); a non-zero exit is `Ok`.
    async fn run(&self, spec: &CommandSpec) -> std::io::Result<CommandOutput>;
}

/// [`CommandRunner`] backed by `tokio::process`
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    /// Optional upper bound per command
    pub timeout: Option<Duration>,
}

impl ProcessRunner {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, spec: &CommandSpec) -> std::io::Result<CommandOutput> {
        debug!("Running `{}` in {}", spec.display(), spec.current_dir.display());

        let mut command = Command::new(&spec.program);
        command
            .args(&spec.args)
            .current_dir(&spec.current_dir)
            .kill_on_drop(true);

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, command.output())
                .await
                .map_err(|_| {
                    std::io::Error::new(
                        std::io::ErrorKind::TimedOut,
                        format!("`{}` timed out after {:?}", spec.display(), limit),
                    )
                })??,
            None => command.output().await?,
        };

        Ok(CommandOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn spec(argv: &[&str]) -> CommandSpec {
        let argv: Vec<String> = argv.iter().map(|s| s.to_string()).collect();
        CommandSpec::from_argv(&argv, std::env::temp_dir()).unwrap()
    }

    #[test]
    fn test_from_argv() {
        assert!(CommandSpec::from_argv(&[], "/tmp").is_none());
        let s = spec(&["git", "pull", "origin", "staging"]);
        assert_eq!(s.program, "git");
        assert_eq!(s.display(), "git pull origin staging");
    }

    #[tokio::test]
    async fn test_captures_output_and_exit_code() {
        let runner = ProcessRunner::default();
        let output = runner
            .run(&spec(&["sh", "-c", "echo out; echo err >&2; exit 3"]))
            .await
            .unwrap();

        assert_eq!(output.exit_code, Some(3));
        assert!(!output.success());
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
    }

    #[tokio::test]
    async fn test_missing_program_is_error() {
        let runner = ProcessRunner::default();
        let result = runner.run(&spec(&["definitely-not-a-real-binary-xyz"])).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_timeout() {
        let runner = ProcessRunner::new(Some(Duration::from_millis(50)));
        let err = runner.run(&spec(&["sleep", "5"])).await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::TimedOut);
    }
}
