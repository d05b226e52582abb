//! # Adapters
//!
//! Receiver-boundary implementations and the telemetry projection.

pub mod bus;
pub mod sinks;

pub use sinks::{ChannelSink, FanoutSink, LogSink};
