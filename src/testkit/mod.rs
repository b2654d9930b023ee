//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`domain`] - Builders for ids, market configs and observations.
//! - [`config`] - Canonical engine settings and resolution policies.
//! - [`harness`] - [`TestHarness`](harness::TestHarness): an engine wired to a
//!   manual clock and in-memory value sources.

pub mod config;
pub mod domain;
pub mod harness;

pub use harness::TestHarness;
