//! # Outbound Ports (Driven Ports)
//!
//! Dependencies the engine requires the host application to provide. The
//! keyed store and janitor ports live in their own crates (wp-02, wp-03);
//! what remains here is the receiver boundary.

use crate::domain::JourneyUpdate;
use async_trait::async_trait;
use thiserror::Error;

/// A receiver failure.
///
/// Caught and logged per invocation by the engine; never retried and never
/// propagated to the caller of the triggering operation.
#[derive(Debug, Clone, Error)]
#[error("notification sink failed: {reason}")]
pub struct SinkError {
    /// What went wrong, for the engine's error log.
    pub reason: String,
}

impl SinkError {
    /// Create a sink error.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Receiver of unified journey notifications.
///
/// Invoked synchronously by the engine, once per emitted notification, in
/// emission order per correlation operation.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver one notification.
    async fn deliver(&self, update: &JourneyUpdate) -> Result<(), SinkError>;
}
