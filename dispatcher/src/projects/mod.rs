//! Static project configuration

pub mod config;
pub mod registry;

pub use config::{ProjectConfig, ProjectFlavor};
pub use registry::{NotFound, ProjectRegistry};
