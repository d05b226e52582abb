//! # Domain Invariants
//!
//! Structural checks applied to journeys before they enter correlation.

use super::errors::MatchError;
use super::journey::SentJourney;

/// A journey's path must be non-empty and terminate at its destination.
pub fn invariant_leg_path(journey: &SentJourney) -> Result<(), MatchError> {
    let Some(last) = journey.legs.last() else {
        return Err(MatchError::InvalidJourney {
            reason: "legs is empty".to_string(),
        });
    };
    if last.to != journey.destination.chain_id {
        return Err(MatchError::InvalidJourney {
            reason: format!(
                "final leg arrives at {} but destination is {}",
                last.to, journey.destination.chain_id
            ),
        });
    }
    if journey.waypoint.leg_index >= journey.legs.len() {
        return Err(MatchError::InvalidJourney {
            reason: format!(
                "waypoint leg index {} out of range for {} legs",
                journey.waypoint.leg_index,
                journey.legs.len()
            ),
        });
    }
    Ok(())
}
