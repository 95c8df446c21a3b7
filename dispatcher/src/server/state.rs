//! Server state

use std::sync::Arc;

use crate::dispatch::Dispatcher;
use crate::utils::VersionInfo;

/// Server state shared across handlers
pub struct ServerState {
    pub dispatcher: Arc<Dispatcher>,
    pub version: VersionInfo,
}

impl ServerState {
    pub fn new(dispatcher: Arc<Dispatcher>, version: VersionInfo) -> Self {
        Self {
            dispatcher,
            version,
        }
    }
}
