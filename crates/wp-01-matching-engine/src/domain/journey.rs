//! # Journey Model
//!
//! Core entities describing a cross-chain message journey and the partial
//! observations the engine correlates.

use serde::{Deserialize, Serialize};
use shared_types::{AccountId, BlockRef, ChainId, HexPayload, MessageToken, Outcome};

/// Transport kind of one journey leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegKind {
    /// Vertical message passing (relay ↔ parachain).
    Vmp,
    /// Horizontal message passing between parachains, routed via a relay.
    Hrmp,
    /// A stop on an intermediate chain that re-sends the message.
    Hop,
    /// A crossing between independent consensus systems.
    Bridge,
}

/// One origin→destination segment of a journey's planned path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leg {
    /// Chain the leg departs from.
    pub from: ChainId,
    /// Chain the leg arrives at.
    pub to: ChainId,
    /// Transport kind of this segment.
    pub kind: LegKind,
    /// Relay chain routing the leg, when one is involved.
    #[serde(default)]
    pub relay: Option<ChainId>,
    /// Partial payload captured for this segment, used by the heuristic
    /// matcher when no topic id is available.
    #[serde(default)]
    pub partial_message: Option<HexPayload>,
}

/// A journey endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Terminus {
    /// Chain of the endpoint.
    pub chain_id: ChainId,
}

impl Terminus {
    /// Create a terminus.
    pub fn new(chain_id: impl Into<ChainId>) -> Self {
        Self {
            chain_id: chain_id.into(),
        }
    }
}

/// A journey endpoint with full observation context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminusContext {
    /// Chain of the endpoint.
    pub chain_id: ChainId,
    /// Block the observation came from.
    pub block: BlockRef,
    /// Execution outcome at this endpoint.
    pub outcome: Outcome,
    /// Error detail when the outcome is `Fail`.
    #[serde(default)]
    pub error: Option<String>,
}

/// Context of the chain currently emitting the message — the waypoint the
/// observation was decoded at, annotated with its position in the path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaypointContext {
    /// Chain the send was observed on.
    pub chain_id: ChainId,
    /// Block the send was observed in.
    pub block: BlockRef,
    /// Index into `legs` of the segment this send starts.
    pub leg_index: usize,
    /// Message hash assigned at this waypoint.
    pub message_hash: MessageToken,
    /// Raw message payload as emitted at this waypoint.
    #[serde(default)]
    pub message_data: Option<HexPayload>,
}

/// An observed outbound send, annotated by the decoding layer with the
/// statically-derived remaining path.
///
/// Created once by the decoder and read-only thereafter; the engine only
/// stores, merges, and deletes copies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentJourney {
    /// Origin of the journey.
    pub origin: TerminusContext,
    /// Final destination of the journey.
    pub destination: Terminus,
    /// The waypoint this send was observed at (equals `origin` for the
    /// first leg, an intermediate chain for re-sends).
    pub waypoint: WaypointContext,
    /// Full planned path from origin to final destination.
    pub legs: Vec<Leg>,
    /// Original sender, when the decoder could attribute one.
    #[serde(default)]
    pub sender: Option<AccountId>,
    /// Explicit topic id, available on the newer protocol revision.
    #[serde(default)]
    pub message_id: Option<MessageToken>,
    /// Token linking a send forwarded from a different consensus system
    /// back to its bridged origin.
    #[serde(default)]
    pub forward_id: Option<MessageToken>,
}

impl SentJourney {
    /// The message hash assigned at the current waypoint.
    #[must_use]
    pub fn hash_token(&self) -> &MessageToken {
        &self.waypoint.message_hash
    }

    /// The topic id, when present and distinct from the hash.
    ///
    /// A decoder that could not extract a topic sets `message_id` to the
    /// hash on some paths; a non-distinct id adds no correlation power.
    #[must_use]
    pub fn topic_token(&self) -> Option<&MessageToken> {
        self.message_id
            .as_ref()
            .filter(|id| *id != &self.waypoint.message_hash)
    }

    /// Correlation tokens in precedence order: topic id first (survives
    /// re-encoding across hops), then the waypoint hash.
    #[must_use]
    pub fn tokens(&self) -> Vec<&MessageToken> {
        let mut tokens = Vec::with_capacity(2);
        if let Some(id) = self.topic_token() {
            tokens.push(id);
        }
        tokens.push(self.hash_token());
        tokens
    }

    /// Intermediate stop chains: the arrival chain of every leg that is
    /// neither the final destination nor a bridge crossing.
    #[must_use]
    pub fn hop_stops(&self) -> Vec<&ChainId> {
        self.legs
            .iter()
            .filter(|leg| leg.kind != LegKind::Bridge && leg.to != self.destination.chain_id)
            .map(|leg| &leg.to)
            .collect()
    }

    /// Chains on either side of every bridge leg; the journey is parked
    /// under these so bridge-hub observations and post-bridge re-sends can
    /// find their origin.
    #[must_use]
    pub fn bridge_chains(&self) -> Vec<&ChainId> {
        self.legs
            .iter()
            .filter(|leg| leg.kind == LegKind::Bridge)
            .flat_map(|leg| [&leg.from, &leg.to])
            .collect()
    }

    /// Whether `chain` is this journey's final destination.
    #[must_use]
    pub fn is_destination(&self, chain: &ChainId) -> bool {
        self.destination.chain_id == *chain
    }
}

/// An observed receipt — final destination or intermediate hop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundReceipt {
    /// Chain the receipt was observed on.
    pub chain_id: ChainId,
    /// Message hash at the receiving chain.
    pub message_hash: MessageToken,
    /// Explicit topic id, when the protocol revision provides one.
    #[serde(default)]
    pub message_id: Option<MessageToken>,
    /// Block the receipt was observed in.
    pub block: BlockRef,
    /// Execution outcome at the receiving chain.
    pub outcome: Outcome,
    /// Error detail when the outcome is `Fail`.
    #[serde(default)]
    pub error: Option<String>,
    /// Payload of an assets-trapped event observed alongside the receipt.
    #[serde(default)]
    pub assets_trapped: Option<HexPayload>,
    /// Raw message payload; backfilled from the payload cache when the
    /// receipt event itself did not carry it.
    #[serde(default)]
    pub message_data: Option<HexPayload>,
}

impl InboundReceipt {
    /// The topic id, when present and distinct from the hash.
    #[must_use]
    pub fn topic_token(&self) -> Option<&MessageToken> {
        self.message_id
            .as_ref()
            .filter(|id| *id != &self.message_hash)
    }

    /// Correlation tokens in precedence order: topic id, then hash.
    #[must_use]
    pub fn tokens(&self) -> Vec<&MessageToken> {
        let mut tokens = Vec::with_capacity(2);
        if let Some(id) = self.topic_token() {
            tokens.push(id);
        }
        tokens.push(&self.message_hash);
        tokens
    }
}

/// An observation at the relay chain that routed an HRMP leg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayedObservation {
    /// Chain the relayed leg departed from.
    pub origin: ChainId,
    /// Chain the relayed leg is addressed to.
    pub recipient: ChainId,
    /// Message hash as seen by the relay.
    pub message_hash: MessageToken,
    /// Explicit topic id, when present.
    #[serde(default)]
    pub message_id: Option<MessageToken>,
    /// Raw message payload carried by the relay, used for heuristic
    /// matching.
    pub message_data: HexPayload,
    /// Relay-chain block of the observation.
    pub block: BlockRef,
    /// Outcome reported by the relay.
    pub outcome: Outcome,
}

impl RelayedObservation {
    /// Correlation tokens in precedence order: topic id, then hash.
    #[must_use]
    pub fn tokens(&self) -> Vec<&MessageToken> {
        let mut tokens = Vec::with_capacity(2);
        if let Some(id) = self
            .message_id
            .as_ref()
            .filter(|id| *id != &self.message_hash)
        {
            tokens.push(id);
        }
        tokens.push(&self.message_hash);
        tokens
    }
}

/// A raw payload record for the short-lived message-data cache, keyed by
/// hash and (when present) topic id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageData {
    /// Hash of the payload.
    pub message_hash: MessageToken,
    /// The payload bytes.
    pub data: HexPayload,
    /// Topic id associated with the payload, when known.
    #[serde(default)]
    pub topic_id: Option<MessageToken>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leg(from: &str, to: &str, kind: LegKind) -> Leg {
        Leg {
            from: ChainId::from(from),
            to: ChainId::from(to),
            kind,
            relay: None,
            partial_message: None,
        }
    }

    fn journey(legs: Vec<Leg>, dest: &str) -> SentJourney {
        SentJourney {
            origin: TerminusContext {
                chain_id: ChainId::from("0"),
                block: BlockRef::new("0xb0", 1),
                outcome: Outcome::Success,
                error: None,
            },
            destination: Terminus::new(dest),
            waypoint: WaypointContext {
                chain_id: ChainId::from("0"),
                block: BlockRef::new("0xb0", 1),
                leg_index: 0,
                message_hash: MessageToken::from("0xaa"),
                message_data: None,
            },
            legs,
            sender: None,
            message_id: None,
            forward_id: None,
        }
    }

    #[test]
    fn topic_token_filters_non_distinct_id() {
        let mut j = journey(vec![leg("0", "1000", LegKind::Vmp)], "1000");
        assert_eq!(j.topic_token(), None);

        j.message_id = Some(MessageToken::from("0xaa"));
        assert_eq!(j.topic_token(), None, "id equal to hash adds nothing");

        j.message_id = Some(MessageToken::from("0x11"));
        assert_eq!(j.topic_token(), Some(&MessageToken::from("0x11")));
        assert_eq!(j.tokens().len(), 2);
    }

    #[test]
    fn hop_stops_exclude_destination_and_bridge_legs() {
        let j = journey(
            vec![
                leg("0", "1000", LegKind::Hop),
                leg("1000", "bh-a", LegKind::Hrmp),
                leg("bh-a", "bh-b", LegKind::Bridge),
                leg("bh-b", "e-1000", LegKind::Hrmp),
            ],
            "e-1000",
        );
        let stops: Vec<_> = j.hop_stops().into_iter().map(ChainId::as_str).collect();
        assert_eq!(stops, vec!["1000", "bh-a"]);
        let bridges: Vec<_> = j.bridge_chains().into_iter().map(ChainId::as_str).collect();
        assert_eq!(bridges, vec!["bh-a", "bh-b"]);
    }
}
