//! stagehook - Entry Point
//!
//! Listens for repository webhooks and redeploys the matching staging
//! checkout when its deployment branch moves.

use std::collections::HashMap;
use std::env;
use std::process::ExitCode;

use anyhow::{Context, Result};
use secrecy::SecretString;
use stagehook::app::options::AppOptions;
use stagehook::app::run::run;
use stagehook::filesys::file::File;
use stagehook::logs::{init_logging, LogOptions};
use stagehook::projects::ProjectRegistry;
use stagehook::storage::settings::{Settings, SECRET_ENV_VAR};
use stagehook::utils::version_info;

use tracing::{error, info};

const DEFAULT_CONFIG_PATH: &str = "stagehook.json";

/// Collect `--key=value` and bare `--flag` arguments
fn parse_cli_args(args: impl IntoIterator<Item = String>) -> HashMap<String, String> {
    let mut cli_args = HashMap::new();
    for arg in args {
        if let Some((key, value)) = arg.split_once('=') {
            let clean_key = key.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), value.to_string());
        } else if arg.starts_with("--") {
            let clean_key = arg.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), "true".to_string());
        }
    }
    cli_args
}

async fn load_settings(path: &str) -> Result<Settings> {
    let settings = File::new(path)
        .read_json::<Settings>()
        .await
        .with_context(|| format!("unable to read settings file {path}"))?;
    settings.validate().context("invalid settings")?;
    Ok(settings)
}

/// Everything after logging is up; errors bubble to `main`
async fn start(settings: Settings, secret: SecretString, check_only: bool) -> Result<()> {
    if check_only {
        let registry = ProjectRegistry::new(settings.projects.clone())
            .context("invalid project configuration")?;
        println!("Configuration OK: {} project(s)", registry.len());
        return Ok(());
    }

    let options = AppOptions::from_settings(&settings);
    info!("Running stagehook {} with options: {:?}", version_info().version, options);

    run(options, secret, settings.projects, await_shutdown_signal())
        .await
        .context("dispatcher stopped with an error")
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli_args = parse_cli_args(env::args().skip(1));

    // Print version and exit
    if cli_args.contains_key("version") {
        let version = version_info();
        match serde_json::to_string_pretty(&version) {
            Ok(json) => println!("{json}"),
            Err(_) => println!("{}", version.version),
        }
        return ExitCode::SUCCESS;
    }

    let config_path = cli_args
        .get("config")
        .cloned()
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let settings = match load_settings(&config_path).await {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{e:#}");
            return ExitCode::FAILURE;
        }
    };

    let log_options = LogOptions {
        log_level: settings.log_level.clone(),
        log_dir: settings.log_dir.clone(),
        json_format: settings.json_logs,
        ..Default::default()
    };
    let _log_guard = match init_logging(log_options) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            None
        }
    };

    // Refuse to start without a secret
    let secret = match settings.resolve_secret(env::var(SECRET_ENV_VAR).ok()) {
        Ok(secret) => secret,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match start(settings, secret, cli_args.contains_key("check")).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn await_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let (mut sigterm, mut sigint) =
            match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                (Ok(term), Ok(int)) => (term, int),
                _ => {
                    error!("Failed to install signal handlers, falling back to Ctrl+C");
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };

        tokio::select! {
            _ = sigterm.recv() => {
                info!("SIGTERM received, shutting down...");
            }
            _ = sigint.recv() => {
                info!("SIGINT received, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
        }
        info!("Ctrl+C received, shutting down...");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> HashMap<String, String> {
        parse_cli_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_cli_args() {
        let parsed = args(&["--config=/etc/stagehook.json", "--check", "stray"]);
        assert_eq!(parsed.get("config").map(String::as_str), Some("/etc/stagehook.json"));
        assert_eq!(parsed.get("check").map(String::as_str), Some("true"));
        assert_eq!(parsed.len(), 2);
    }

    #[tokio::test]
    async fn test_load_settings_error_names_the_file() {
        let err = load_settings("/nonexistent/stagehook.json").await.unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("unable to read settings file /nonexistent/stagehook.json"));
        assert!(message.contains("IO error"));
    }

    #[tokio::test]
    async fn test_load_settings_rejects_invalid_values() {
        let path = env::temp_dir().join(format!("stagehook-{}.json", uuid::Uuid::new_v4()));
        tokio::fs::write(&path, r#"{"deployment_branch": " "}"#).await.unwrap();

        let err = load_settings(path.to_str().unwrap()).await.unwrap_err();
        assert!(format!("{err:#}").starts_with("invalid settings"));

        tokio::fs::remove_file(&path).await.unwrap();
    }
}
