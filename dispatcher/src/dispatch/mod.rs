//! Event classification and orchestration

pub mod classifier;
pub mod dispatcher;

pub use classifier::{Decision, EventClassifier, IgnoreReason};
pub use dispatcher::{DeliveryHeaders, Dispatcher, DispatcherOptions};
