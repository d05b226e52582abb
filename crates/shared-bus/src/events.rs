//! # Journey Events
//!
//! Defines the observational events that flow through the shared bus.
//! Each variant is a light projection of a matching-engine notification:
//! identifiers and context only, never full payloads.

use serde::{Deserialize, Serialize};
use shared_types::{BridgeStage, ChainId, HopDirection, MessageToken, Outcome};

/// All events that can be published to the telemetry bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JourneyEvent {
    /// A new outbound journey was observed at its origin.
    Sent {
        /// Origin chain of the journey.
        origin: ChainId,
        /// Final destination chain.
        destination: ChainId,
        /// Correlation token (topic id when present, message hash otherwise).
        token: MessageToken,
        /// Number of legs in the planned path.
        legs: usize,
    },

    /// A journey was correlated with its destination receipt.
    Received {
        /// Origin chain of the journey.
        origin: ChainId,
        /// Final destination chain.
        destination: ChainId,
        /// Correlation token.
        token: MessageToken,
        /// Execution outcome at the destination.
        outcome: Outcome,
    },

    /// A journey was correlated with its relay-chain observation.
    Relayed {
        /// Origin chain of the relayed leg.
        origin: ChainId,
        /// Recipient chain of the relayed leg.
        recipient: ChainId,
        /// Correlation token.
        token: MessageToken,
    },

    /// A journey touched an intermediate hop chain.
    Hop {
        /// The intermediate chain.
        chain_id: ChainId,
        /// Whether the hop leg was inbound or outbound at that chain.
        direction: HopDirection,
        /// Correlation token.
        token: MessageToken,
    },

    /// A journey progressed across a consensus-system bridge.
    Bridge {
        /// Chain the bridge observation came from.
        chain_id: ChainId,
        /// Stage of the crossing.
        stage: BridgeStage,
        /// Channel/nonce bridge key.
        bridge_key: String,
    },

    /// An outbound journey expired unmatched.
    Timeout {
        /// Origin chain of the journey.
        origin: ChainId,
        /// Final destination chain it never (observably) reached.
        destination: ChainId,
        /// Correlation token.
        token: MessageToken,
    },

    /// The engine hit a non-fatal failure worth surfacing.
    EngineError {
        /// Operation that failed (`on_inbound_message`, `sink`, ...).
        operation: String,
        /// Human-readable detail.
        detail: String,
    },
}

impl JourneyEvent {
    /// Topic this event belongs to.
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            JourneyEvent::Sent { .. } => EventTopic::Sent,
            JourneyEvent::Received { .. } => EventTopic::Received,
            JourneyEvent::Relayed { .. } => EventTopic::Relayed,
            JourneyEvent::Hop { .. } => EventTopic::Hop,
            JourneyEvent::Bridge { .. } => EventTopic::Bridge,
            JourneyEvent::Timeout { .. } => EventTopic::Timeout,
            JourneyEvent::EngineError { .. } => EventTopic::Errors,
        }
    }

    /// Chain the event is primarily about, when one applies.
    #[must_use]
    pub fn chain_id(&self) -> Option<&ChainId> {
        match self {
            JourneyEvent::Sent { origin, .. }
            | JourneyEvent::Relayed { origin, .. }
            | JourneyEvent::Timeout { origin, .. } => Some(origin),
            JourneyEvent::Received { destination, .. } => Some(destination),
            JourneyEvent::Hop { chain_id, .. } | JourneyEvent::Bridge { chain_id, .. } => {
                Some(chain_id)
            }
            JourneyEvent::EngineError { .. } => None,
        }
    }
}

/// Routing topics for subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventTopic {
    /// New outbound journeys.
    Sent,
    /// Completed correlations.
    Received,
    /// Relay-chain correlations.
    Relayed,
    /// Intermediate hop activity.
    Hop,
    /// Bridge crossings.
    Bridge,
    /// Expired journeys.
    Timeout,
    /// Engine error events.
    Errors,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Chains to include. Empty means all chains.
    pub chains: Vec<ChainId>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            chains: Vec::new(),
        }
    }

    /// Create a filter for events touching specific chains.
    #[must_use]
    pub fn chains(chains: Vec<ChainId>) -> Self {
        Self {
            topics: Vec::new(),
            chains,
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &JourneyEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let chain_match = self.chains.is_empty()
            || event
                .chain_id()
                .is_some_and(|chain| self.chains.contains(chain));

        topic_match && chain_match
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sent_event() -> JourneyEvent {
        JourneyEvent::Sent {
            origin: ChainId::from("0"),
            destination: ChainId::from("2004"),
            token: MessageToken::from("0xaa"),
            legs: 2,
        }
    }

    #[test]
    fn test_event_topic_mapping() {
        assert_eq!(sent_event().topic(), EventTopic::Sent);
        let err = JourneyEvent::EngineError {
            operation: "sink".into(),
            detail: "boom".into(),
        };
        assert_eq!(err.topic(), EventTopic::Errors);
        assert_eq!(err.chain_id(), None);
    }

    #[test]
    fn test_filter_all() {
        assert!(EventFilter::all().matches(&sent_event()));
    }

    #[test]
    fn test_filter_by_topic() {
        let filter = EventFilter::topics(vec![EventTopic::Received]);
        assert!(!filter.matches(&sent_event()));
        let filter = EventFilter::topics(vec![EventTopic::Sent, EventTopic::Timeout]);
        assert!(filter.matches(&sent_event()));
    }

    #[test]
    fn test_filter_by_chain() {
        let filter = EventFilter::chains(vec![ChainId::from("0")]);
        assert!(filter.matches(&sent_event()));
        let filter = EventFilter::chains(vec![ChainId::from("3000")]);
        assert!(!filter.matches(&sent_event()));
    }
}
