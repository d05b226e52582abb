//! Projection of full notifications onto light telemetry events.

use crate::domain::JourneyUpdate;
use shared_bus::JourneyEvent;
use shared_types::MessageToken;

/// Project one notification onto its telemetry event.
///
/// Events carry identifiers and context, never full payloads: the bus is
/// for dashboards and counters, not delivery.
#[must_use]
pub fn project(update: &JourneyUpdate) -> JourneyEvent {
    match update {
        JourneyUpdate::Sent(n) => JourneyEvent::Sent {
            origin: n.journey.origin.chain_id.clone(),
            destination: n.journey.destination.chain_id.clone(),
            token: primary_token(&n.journey),
            legs: n.journey.legs.len(),
        },
        JourneyUpdate::Received(n) => JourneyEvent::Received {
            origin: n.journey.origin.chain_id.clone(),
            destination: n.journey.destination.chain_id.clone(),
            token: primary_token(&n.journey),
            outcome: n.receipt.outcome,
        },
        JourneyUpdate::Relayed(n) => JourneyEvent::Relayed {
            origin: n.relay.origin.clone(),
            recipient: n.relay.recipient.clone(),
            token: n.relay.message_hash.clone(),
        },
        JourneyUpdate::Hop(n) => JourneyEvent::Hop {
            chain_id: n.chain_id.clone(),
            direction: n.direction,
            token: primary_token(&n.journey),
        },
        JourneyUpdate::Bridge(n) => JourneyEvent::Bridge {
            chain_id: n.chain_id.clone(),
            stage: n.stage,
            bridge_key: n.bridge_key.as_str().to_string(),
        },
        JourneyUpdate::Timeout(n) => JourneyEvent::Timeout {
            origin: n.journey.origin.chain_id.clone(),
            destination: n.journey.destination.chain_id.clone(),
            token: primary_token(&n.journey),
        },
    }
}

/// The journey's most stable identifier: topic id when present, waypoint
/// hash otherwise.
fn primary_token(journey: &crate::domain::SentJourney) -> MessageToken {
    journey
        .topic_token()
        .unwrap_or_else(|| journey.hash_token())
        .clone()
}
