//! # Domain Layer
//!
//! Journey model, correlation keys, matching algorithms, and errors.

pub mod backoff;
pub mod bridge;
pub mod errors;
pub mod fuzzy;
pub mod invariants;
pub mod journey;
pub mod keys;
pub mod notifications;

pub use backoff::RetryPolicy;
pub use bridge::{BridgeInbound, BridgeKey, BridgeOutboundAccepted, BridgeOutboundDelivered};
pub use errors::MatchError;
pub use fuzzy::fuzzy_payload_match;
pub use invariants::invariant_leg_path;
pub use journey::{
    InboundReceipt, Leg, LegKind, MessageData, RelayedObservation, SentJourney, Terminus,
    TerminusContext, WaypointContext,
};
pub use keys::CorrelationKey;
pub use notifications::{
    JourneyBridge, JourneyHop, JourneyReceived, JourneyRelayed, JourneySent, JourneyTimeout,
    JourneyUpdate,
};
