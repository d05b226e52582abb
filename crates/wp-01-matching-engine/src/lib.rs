//! # WP-01 Matching Engine
//!
//! Correlates independently-observed cross-chain message events into
//! unified journey notifications.
//!
//! ## Purpose
//!
//! Decoders watching individual chains report partial observations — an
//! outbound send, an inbound receipt, a relay confirmation, a bridge
//! crossing — with no ordering guarantee, possible duplication, and no
//! guarantee of ever completing. The engine ties these partials together:
//!
//! - exact correlation by `(chain, token)` keys, with both a message-hash
//!   key and a topic-id key when the protocol revision provides one
//! - heuristic payload matching when no topic id disambiguates multi-hop
//!   paths
//! - bounded retry around the inbound race (a receipt observed fractionally
//!   before its send finishes persisting)
//! - janitor-driven expiry so unmatched state never accumulates, surfaced
//!   as `Timeout` notifications
//!
//! ## Module Structure
//!
//! ```text
//! wp-01-matching-engine/
//! ├── domain/      # journey model, correlation keys, fuzzy matcher, backoff
//! ├── ports/       # MatchingApi (driving), NotificationSink (driven)
//! ├── service/     # MatchingEngine correlation flows
//! └── adapters/    # log/fan-out sinks, bus projection
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use domain::{
    fuzzy_payload_match, BridgeInbound, BridgeKey, BridgeOutboundAccepted,
    BridgeOutboundDelivered, CorrelationKey, InboundReceipt, JourneyBridge, JourneyHop,
    JourneyReceived, JourneyRelayed, JourneySent, JourneyTimeout, JourneyUpdate, Leg, LegKind,
    MatchError, MessageData, RelayedObservation, RetryPolicy, SentJourney, Terminus,
    TerminusContext, WaypointContext,
};
pub use ports::{MatchingApi, NotificationSink, SinkError};
pub use service::{EngineConfig, MatchingEngine};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
