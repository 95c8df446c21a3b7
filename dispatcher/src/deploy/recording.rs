//! Command runners that do not execute anything
//!
//! [`DryRunRunner`] backs the `dry_run` setting and only logs.
//! [`RecordingRunner`] keeps every command it sees and is the fake used by the
//! test suites.

use std::sync::Mutex;

use async_trait::async_trait;
use tracing::info;

use crate::deploy::runner::{CommandOutput, CommandRunner, CommandSpec};

/// Logs each command and reports success without running it
///
/// Holds no per-command state, so a long-lived dry-run server stays flat.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunRunner;

impl DryRunRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for DryRunRunner {
    async fn run(&self, spec: &CommandSpec) -> std::io::Result<CommandOutput> {
        info!(
            "[dry-run] {} (in {})",
            spec.display(),
            spec.current_dir.display()
        );
        Ok(CommandOutput {
            exit_code: Some(0),
            ..Default::default()
        })
    }
}

/// Records every command and answers with a scripted result
///
/// History is never trimmed; use it for tests, not for a running server.
///
/// Commands succeed with empty output unless a registered failure prefix
/// matches their display string.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<CommandSpec>>,
    failures: Mutex<Vec<(String, CommandOutput)>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make commands whose display string starts with `prefix` return `output`.
    pub fn fail_on(&self, prefix: impl Into<String>, output: CommandOutput) {
        self.failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((prefix.into(), output));
    }

    /// Everything run so far
    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Display strings of everything run so far
    pub fn command_lines(&self) -> Vec<String> {
        self.calls().iter().map(CommandSpec::display).collect()
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, spec: &CommandSpec) -> std::io::Result<CommandOutput> {
        let line = spec.display();

        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(spec.clone());

        let failures = self.failures.lock().unwrap_or_else(|e| e.into_inner());
        let scripted = failures
            .iter()
            .find(|(prefix, _)| line.starts_with(prefix.as_str()))
            .map(|(_, output)| output.clone());

        Ok(scripted.unwrap_or(CommandOutput {
            exit_code: Some(0),
            ..Default::default()
        }))
    }
}
