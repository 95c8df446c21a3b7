//! Main application run loop

use std::future::Future;

use secrecy::SecretString;
use tracing::{error, info};

use crate::app::options::AppOptions;
use crate::app::state::AppState;
use crate::errors::AppError;
use crate::projects::ProjectConfig;
use crate::server::serve::serve;
use crate::server::state::ServerState;
use crate::utils::version_info;

/// Run the dispatcher until `shutdown_signal` resolves
pub async fn run(
    options: AppOptions,
    secret: SecretString,
    projects: Vec<ProjectConfig>,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), AppError> {
    info!("Initializing stagehook...");

    let app_state = AppState::init(&options, secret, projects)?;
    let server_state = ServerState::new(app_state.dispatcher.clone(), version_info());

    let handle = serve(&options.server, server_state, shutdown_signal).await?;

    match handle.await {
        Ok(result) => {
            info!("HTTP server stopped");
            result
        }
        Err(e) => {
            error!("HTTP server task failed: {}", e);
            Err(AppError::ShutdownError(e.to_string()))
        }
    }
}
