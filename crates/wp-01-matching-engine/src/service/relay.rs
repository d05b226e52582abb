//! Relay correlation flow.

use super::{MatchingEngine, NS_HOP, NS_OUTBOUND, NS_RELAY};
use crate::domain::{
    CorrelationKey, JourneyRelayed, JourneyUpdate, MatchError, RelayedObservation, SentJourney,
};
use tracing::debug;
use wp_03_janitor::SweepTask;

impl MatchingEngine {
    /// Correlate a relay-chain observation of an HRMP leg.
    ///
    /// Matched by recipient and token against stored outbound entries,
    /// then against hop entries (a relay observed for an intermediate
    /// stop), then heuristically by leg payload; otherwise stored for a
    /// later-arriving outbound to resolve.
    pub(crate) async fn handle_relayed(&self, msg: RelayedObservation) -> Result<(), MatchError> {
        self.ensure_running()?;
        let stores = self.stores.lock().await;

        // Exact match, outbound before hop (namespace precedence).
        for ns in [NS_OUTBOUND, NS_HOP] {
            for token in msg.tokens() {
                let key =
                    CorrelationKey::new(msg.recipient.clone(), token.clone()).storage_key();
                if let Some(journey) = stores.get::<SentJourney>(ns, &key).await? {
                    self.emit(JourneyUpdate::Relayed(JourneyRelayed {
                        journey,
                        relay: msg.clone(),
                    }))
                    .await;
                    return Ok(());
                }
            }
        }

        // Heuristic leg match for hop stops whose tokens diverged.
        for ns in [NS_OUTBOUND, NS_HOP] {
            if let Some(journey) = self
                .scan_for_leg_match(&stores, ns, &msg.recipient, msg.message_data.as_bytes())
                .await?
            {
                self.emit(JourneyUpdate::Relayed(JourneyRelayed {
                    journey,
                    relay: msg.clone(),
                }))
                .await;
                return Ok(());
            }
        }

        // Store-and-wait under every token.
        let mut sweeps = Vec::with_capacity(2);
        for token in msg.tokens() {
            let key = CorrelationKey::new(msg.recipient.clone(), token.clone()).storage_key();
            stores.put(NS_RELAY, &key, &msg).await?;
            sweeps.push(SweepTask::with_expiry(
                NS_RELAY,
                key,
                self.config.relay_ttl,
            ));
        }
        self.schedule_sweeps(sweeps);
        debug!(
            origin = %msg.origin,
            recipient = %msg.recipient,
            token = %msg.message_hash,
            "Relay observation persisted awaiting its outbound"
        );
        drop(stores);
        tokio::task::yield_now().await;
        Ok(())
    }
}
