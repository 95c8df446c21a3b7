//! Deployment execution

pub mod lock;
pub mod pipeline;
pub mod recording;
pub mod result;
pub mod runner;
