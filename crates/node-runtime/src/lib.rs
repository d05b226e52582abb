//! # Node Runtime Library
//!
//! This library exposes the internal modules of the tracker runtime for
//! testing. The main entry point is the `waypoint` binary.
//!
//! ## Architecture
//!
//! The runtime is a thin composition root. Everything with behavior lives
//! behind a port:
//!
//! ```text
//! NDJSON feed ──► replay ──► MatchingApi (wp-01)
//!                                │
//!                    ┌───────────┼─────────────┐
//!                    ▼           ▼             ▼
//!              KeyedStore     Janitor    NotificationSink ──► NDJSON out
//!              (wp-02)        (wp-03)          │
//!                                              ▼
//!                                        shared-bus ──► metrics bridge
//! ```

pub mod adapters;
pub mod config;
pub mod replay;
pub mod wiring;

pub use config::{RuntimeConfig, StorageBackend};
pub use replay::ObservationRecord;
pub use wiring::TrackerRuntime;
