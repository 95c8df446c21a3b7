//! Inbound webhook handling: authentication and decoding

pub mod event;
pub mod signature;

pub use event::{DeploymentEvent, EventKind};
