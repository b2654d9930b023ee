//! Infrastructure: configuration, logging and scenario replay.

pub mod config;
pub mod scenario;
