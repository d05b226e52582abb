//! # Inbound Ports
//!
//! API trait defining what the matching engine can do. Decoders and the
//! subscription manager drive the engine exclusively through this trait;
//! all operations may be called concurrently from independent per-chain
//! observers, with the engine's internal lock as the only ordering
//! guarantee.

use crate::domain::{
    BridgeInbound, BridgeOutboundAccepted, BridgeOutboundDelivered, InboundReceipt, MatchError,
    MessageData, RelayedObservation, SentJourney,
};
use async_trait::async_trait;
use std::time::Duration;

/// Matching engine API - inbound port.
#[async_trait]
pub trait MatchingApi: Send + Sync {
    /// Cache a raw message payload for receipts that arrive without one.
    async fn on_message_data(&self, data: MessageData) -> Result<(), MatchError>;

    /// Correlate an observed outbound send.
    ///
    /// Returns the journey as correlated — spliced with its bridged origin
    /// when a forward id resolved. A duplicate send is an idempotent no-op.
    async fn on_outbound_message(
        &self,
        msg: SentJourney,
        ttl: Option<Duration>,
    ) -> Result<SentJourney, MatchError>;

    /// Correlate an observed receipt (final destination or intermediate
    /// hop).
    async fn on_inbound_message(&self, msg: InboundReceipt) -> Result<(), MatchError>;

    /// Correlate a relay-chain observation of an HRMP leg.
    async fn on_relayed_message(&self, msg: RelayedObservation) -> Result<(), MatchError>;

    /// Correlate an acceptance at the exporting bridge hub.
    async fn on_bridge_outbound_accepted(
        &self,
        msg: BridgeOutboundAccepted,
    ) -> Result<(), MatchError>;

    /// Correlate a delivery confirmation at the exporting bridge hub.
    async fn on_bridge_outbound_delivered(
        &self,
        msg: BridgeOutboundDelivered,
    ) -> Result<(), MatchError>;

    /// Correlate a receipt at the importing bridge hub.
    async fn on_bridge_inbound(&self, msg: BridgeInbound) -> Result<(), MatchError>;

    /// Stop accepting operations, after any in-flight correlation
    /// completes.
    async fn stop(&self);
}
