//! # WP-03 Janitor
//!
//! Scheduled expiry sweeps over the keyed store.
//!
//! ## Purpose
//!
//! Correlation state must not accumulate forever: every entry the matching
//! engine persists is paired with a sweep task. When the task's expiry
//! elapses the janitor deletes the entry and broadcasts a [`Sweep`] carrying
//! the last-known value.
//!
//! Sweeps are best-effort by design: an entry consumed by matching logic
//! before its deadline still produces a sweep (with `last_value: None`), and
//! listeners must tolerate these spurious notifications. The engine turns
//! surviving outbound sweeps into `Timeout` notifications and ignores
//! everything else.

pub mod scheduler;

pub use scheduler::{Janitor, JanitorConfig, Sweep, SweepTask};
