//! Wire models shared by the stagehook dispatcher
//!
//! Inbound webhook payloads (Bitbucket-style) and the JSON bodies the
//! dispatcher answers with.

pub mod models;
