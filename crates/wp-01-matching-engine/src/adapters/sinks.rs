//! Receiver adapters.

use crate::domain::JourneyUpdate;
use crate::ports::{NotificationSink, SinkError};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

/// Sink that logs every notification. The default receiver when no
/// delivery layer is wired.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn deliver(&self, update: &JourneyUpdate) -> Result<(), SinkError> {
        match update.journey() {
            Some(journey) => info!(
                kind = update.kind(),
                origin = %journey.origin.chain_id,
                destination = %journey.destination.chain_id,
                token = %journey.hash_token(),
                "Journey notification"
            ),
            None => info!(kind = update.kind(), "Journey notification"),
        }
        Ok(())
    }
}

/// Sink that fans one notification out to several receivers in order.
///
/// Each receiver's failure is isolated: the engine logs it and the
/// remaining receivers still run.
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn NotificationSink>>,
}

impl FanoutSink {
    /// Create an empty fan-out.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a receiver.
    #[must_use]
    pub fn with(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

#[async_trait]
impl NotificationSink for FanoutSink {
    async fn deliver(&self, update: &JourneyUpdate) -> Result<(), SinkError> {
        let mut failures = Vec::new();
        for sink in &self.sinks {
            if let Err(e) = sink.deliver(update).await {
                failures.push(e.reason);
            }
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(SinkError::new(failures.join("; ")))
        }
    }
}

/// Sink that forwards notifications into an mpsc channel; the test
/// receiver, and the building block for the runtime's NDJSON output task.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<JourneyUpdate>,
}

impl ChannelSink {
    /// Create a sink and the receiving half of its channel.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<JourneyUpdate>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl NotificationSink for ChannelSink {
    async fn deliver(&self, update: &JourneyUpdate) -> Result<(), SinkError> {
        self.tx
            .send(update.clone())
            .map_err(|_| SinkError::new("notification channel closed"))
    }
}
