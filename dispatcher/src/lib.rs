//! stagehook
//!
//! Webhook-driven staging deployments: authenticate a delivery, decide whether
//! it moves the deployment branch of a configured project, and run that
//! project's pipeline with at most one deployment per project at a time.

pub mod app;
pub mod deploy;
pub mod dispatch;
pub mod errors;
pub mod filesys;
pub mod logs;
pub mod projects;
pub mod server;
pub mod storage;
pub mod utils;
pub mod webhook;
