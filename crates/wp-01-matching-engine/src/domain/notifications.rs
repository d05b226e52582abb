//! # Journey Notifications
//!
//! The unified notifications the engine produces once partial observations
//! correlate. Each carries the full journey so downstream delivery never
//! needs a second lookup.

use super::bridge::{BridgeInbound, BridgeKey};
use super::journey::{InboundReceipt, RelayedObservation, SentJourney};
use serde::{Deserialize, Serialize};
use shared_types::{BlockRef, BridgeStage, ChainId, HopDirection, Outcome};

/// A unified journey notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum JourneyUpdate {
    /// A new outbound journey was observed.
    Sent(JourneySent),
    /// The journey reached its final destination.
    Received(JourneyReceived),
    /// The relay-chain traversal of a leg was confirmed.
    Relayed(JourneyRelayed),
    /// The journey touched an intermediate hop chain.
    Hop(JourneyHop),
    /// The journey progressed across a consensus bridge.
    Bridge(JourneyBridge),
    /// The journey expired without a destination receipt.
    Timeout(JourneyTimeout),
}

impl JourneyUpdate {
    /// Stable label for logs and metrics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            JourneyUpdate::Sent(_) => "sent",
            JourneyUpdate::Received(_) => "received",
            JourneyUpdate::Relayed(_) => "relayed",
            JourneyUpdate::Hop(_) => "hop",
            JourneyUpdate::Bridge(_) => "bridge",
            JourneyUpdate::Timeout(_) => "timeout",
        }
    }

    /// The journey the notification is about, when one is attached.
    #[must_use]
    pub fn journey(&self) -> Option<&SentJourney> {
        match self {
            JourneyUpdate::Sent(n) => Some(&n.journey),
            JourneyUpdate::Received(n) => Some(&n.journey),
            JourneyUpdate::Relayed(n) => Some(&n.journey),
            JourneyUpdate::Hop(n) => Some(&n.journey),
            JourneyUpdate::Bridge(n) => n.journey.as_ref(),
            JourneyUpdate::Timeout(n) => Some(&n.journey),
        }
    }
}

/// A new outbound journey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JourneySent {
    /// The observed journey, path included.
    pub journey: SentJourney,
}

/// Origin and destination receipt, merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JourneyReceived {
    /// The originating journey.
    pub journey: SentJourney,
    /// The receipt that completed it.
    pub receipt: InboundReceipt,
}

/// Origin and relay observation, merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JourneyRelayed {
    /// The originating journey.
    pub journey: SentJourney,
    /// The relay-chain observation.
    pub relay: RelayedObservation,
}

/// Activity at an intermediate hop chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JourneyHop {
    /// The originating journey (legs preserved unmodified).
    pub journey: SentJourney,
    /// The intermediate chain.
    pub chain_id: ChainId,
    /// Whether the chain received or re-sent the message.
    pub direction: HopDirection,
    /// Block of the hop observation, when one was correlated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block: Option<BlockRef>,
    /// Outcome at the hop, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
}

/// Progress of a consensus-bridge crossing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JourneyBridge {
    /// Stage of the crossing.
    pub stage: BridgeStage,
    /// Bridge-hub chain the stage was observed on.
    pub chain_id: ChainId,
    /// Channel/nonce correlation key.
    pub bridge_key: BridgeKey,
    /// The origin journey, when it had been observed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub journey: Option<SentJourney>,
    /// The importing-hub receipt, for the `Received` stage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inbound: Option<BridgeInbound>,
    /// Block of the stage observation.
    pub block: BlockRef,
}

/// An unmatched journey that expired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JourneyTimeout {
    /// The original Sent journey, replayed verbatim.
    pub journey: SentJourney,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::journey::{Leg, LegKind, Terminus, TerminusContext, WaypointContext};
    use shared_types::{ChainId, MessageToken};

    fn journey() -> SentJourney {
        SentJourney {
            origin: TerminusContext {
                chain_id: ChainId::from("0"),
                block: BlockRef::new("0xb0", 1),
                outcome: Outcome::Success,
                error: None,
            },
            destination: Terminus::new("1000"),
            waypoint: WaypointContext {
                chain_id: ChainId::from("0"),
                block: BlockRef::new("0xb0", 1),
                leg_index: 0,
                message_hash: MessageToken::from("0xaa"),
                message_data: None,
            },
            legs: vec![Leg {
                from: ChainId::from("0"),
                to: ChainId::from("1000"),
                kind: LegKind::Vmp,
                relay: None,
                partial_message: None,
            }],
            sender: None,
            message_id: None,
            forward_id: None,
        }
    }

    #[test]
    fn kind_labels_are_stable() {
        let update = JourneyUpdate::Timeout(JourneyTimeout { journey: journey() });
        assert_eq!(update.kind(), "timeout");
        assert!(update.journey().is_some());
    }

    #[test]
    fn updates_serialize_with_type_tag() {
        let update = JourneyUpdate::Sent(JourneySent { journey: journey() });
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["type"], "sent");
    }
}
