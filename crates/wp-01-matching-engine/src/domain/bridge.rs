//! # Bridge Observations
//!
//! Partial observations of a consensus-system crossing. Message hashes are
//! not preserved across the boundary, so correlation uses a `BridgeKey`
//! derived from the bridge channel and its monotonically increasing nonce
//! (or, equivalently, a topic id carried on both sides).

use super::journey::SentJourney;
use serde::{Deserialize, Serialize};
use shared_types::{BlockRef, ChainId, HexPayload, MessageToken, Outcome};
use std::fmt;

/// Correlation key for a bridge crossing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BridgeKey(pub String);

impl BridgeKey {
    /// Derive a key from a channel identifier and message nonce.
    pub fn from_channel(channel_id: impl fmt::Display, nonce: u64) -> Self {
        Self(format!("{channel_id}:{nonce}"))
    }

    /// Use a topic id observed on both sides of the bridge as the key.
    #[must_use]
    pub fn from_topic(topic: &MessageToken) -> Self {
        Self(topic.as_str().to_string())
    }

    /// Rendered storage key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BridgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Acceptance of an outbound message at the exporting bridge hub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeOutboundAccepted {
    /// Exporting bridge-hub chain.
    pub chain_id: ChainId,
    /// Channel/nonce correlation key.
    pub bridge_key: BridgeKey,
    /// Token linking back to the origin journey. Required; an accepted
    /// observation without it cannot be correlated and is dropped.
    #[serde(default)]
    pub forward_id: Option<MessageToken>,
    /// Block of the acceptance.
    pub block: BlockRef,
    /// Raw message payload as exported, when captured.
    #[serde(default)]
    pub message_data: Option<HexPayload>,
}

/// Delivery confirmation at the exporting bridge hub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeOutboundDelivered {
    /// Exporting bridge-hub chain.
    pub chain_id: ChainId,
    /// Channel/nonce correlation key.
    pub bridge_key: BridgeKey,
    /// Token linking back to the origin journey. Required, as for
    /// acceptance.
    #[serde(default)]
    pub forward_id: Option<MessageToken>,
    /// Block of the confirmation.
    pub block: BlockRef,
}

/// Receipt of a bridged message at the importing bridge hub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeInbound {
    /// Importing bridge-hub chain.
    pub chain_id: ChainId,
    /// Channel/nonce correlation key.
    pub bridge_key: BridgeKey,
    /// Block of the receipt.
    pub block: BlockRef,
    /// Outcome reported by the importing hub.
    pub outcome: Outcome,
    /// Error detail when the outcome is `Fail`.
    #[serde(default)]
    pub error: Option<String>,
}

/// Stored correlation state for an accepted-but-unfinished crossing.
///
/// Lives in its own namespace with a materially longer expiry than
/// same-consensus state, because cross-consensus finality can lag hours
/// behind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeCorrelation {
    /// The acceptance observation.
    pub accepted: BridgeOutboundAccepted,
    /// The origin journey, when the outbound send had already been seen.
    #[serde(default)]
    pub journey: Option<SentJourney>,
    /// Whether delivery has been confirmed at the exporting hub.
    pub delivered: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bridge_key_from_channel_and_nonce() {
        let key = BridgeKey::from_channel("0x00000001", 42);
        assert_eq!(key.as_str(), "0x00000001:42");
    }

    #[test]
    fn bridge_key_from_topic_is_verbatim() {
        let key = BridgeKey::from_topic(&MessageToken::from("0x11"));
        assert_eq!(key.as_str(), "0x11");
    }
}
