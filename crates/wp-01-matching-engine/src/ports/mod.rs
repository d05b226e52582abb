//! # Ports
//!
//! Driving and driven interfaces of the matching engine.

pub mod inbound;
pub mod outbound;

pub use inbound::MatchingApi;
pub use outbound::{NotificationSink, SinkError};
