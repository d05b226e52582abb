//! # Waypoint Test Suite
//!
//! Cross-crate integration tests: full engine flows over the real store,
//! janitor, and bus, plus the runtime's replay boundary.

#[cfg(test)]
pub mod integration;
