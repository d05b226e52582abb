//! Outbound correlation flow and the journey persistence helpers shared
//! with the other flows.

use super::stores::{encode, CorrelationStores};
use super::{MatchingEngine, NS_BRIDGE, NS_HOP, NS_INBOUND, NS_OUTBOUND, NS_RELAY};
use crate::domain::{
    fuzzy_payload_match, invariant_leg_path, CorrelationKey, InboundReceipt, JourneyHop,
    JourneyReceived, JourneyRelayed, JourneySent, JourneyUpdate, MatchError,
    RelayedObservation, SentJourney,
};
use shared_types::{ChainId, HopDirection};
use std::time::Duration;
use tracing::debug;
use wp_02_keyed_store::BatchOp;
use wp_03_janitor::SweepTask;

impl MatchingEngine {
    /// Correlate an observed outbound send.
    pub(crate) async fn handle_outbound(
        &self,
        msg: SentJourney,
        ttl: Option<Duration>,
    ) -> Result<SentJourney, MatchError> {
        self.ensure_running()?;
        invariant_leg_path(&msg)?;
        let stores = self.stores.lock().await;

        // 1. Duplicate guard: redundant decode/retry paths re-submit sends.
        let hash_key =
            CorrelationKey::new(msg.destination.chain_id.clone(), msg.hash_token().clone())
                .storage_key();
        if stores.exists(NS_OUTBOUND, &hash_key).await? {
            debug!(key = %hash_key, "Duplicate outbound send dropped");
            return Ok(msg);
        }

        // 2. A forwarded send re-entering from another consensus system
        //    picks up its bridged origin.
        let msg = self.splice_bridged_origin(&stores, msg).await?;

        // 3. A topic id pointing at a stored hop entry means the observing
        //    chain is an intermediate stop re-sending the message. The
        //    waypoint chain equals the origin chain except for spliced
        //    bridge continuations.
        if let Some(topic) = msg.topic_token().cloned() {
            let key =
                CorrelationKey::new(msg.waypoint.chain_id.clone(), topic).storage_key();
            if let Some(journey) = stores.get::<SentJourney>(NS_HOP, &key).await? {
                // The hop key stays: the inbound half of this stop may not
                // have arrived yet.
                self.emit_hop_out(&journey, &msg).await;
                return Ok(msg);
            }
        }

        // 4. Heuristic hop detection over the observing chain's hop
        //    entries.
        if let Some(payload) = msg.waypoint.message_data.clone() {
            if let Some(journey) = self
                .scan_for_leg_match(&stores, NS_HOP, &msg.waypoint.chain_id, payload.as_bytes())
                .await?
            {
                self.emit_hop_out(&journey, &msg).await;
                // The relay for this re-send may have been observed first.
                self.resolve_relay(&stores, &msg, &journey).await?;
                return Ok(msg);
            }
        }

        // 5. A genuine new outbound.
        self.emit(JourneyUpdate::Sent(JourneySent {
            journey: msg.clone(),
        }))
        .await;
        self.resolve_relay(&stores, &msg, &msg).await?;

        let matched_final = self.match_stored_inbound(&stores, &msg).await?;
        if matched_final {
            self.cleanup_journey(&stores, &msg).await?;
        } else {
            self.persist_journey(&stores, &msg, ttl).await?;
        }
        drop(stores);
        tokio::task::yield_now().await;
        Ok(msg)
    }

    /// Emit a `Hop(Out)` for a stored origin journey resolving at `msg`'s
    /// send.
    async fn emit_hop_out(&self, journey: &SentJourney, msg: &SentJourney) {
        self.emit(JourneyUpdate::Hop(JourneyHop {
            journey: journey.clone(),
            chain_id: msg.waypoint.chain_id.clone(),
            direction: HopDirection::Out,
            block: Some(msg.waypoint.block.clone()),
            outcome: Some(msg.origin.outcome),
        }))
        .await;
    }

    /// Resolve a forwarded send against its stored bridged origin.
    ///
    /// On a hit the stored journey's origin, sender, and full path replace
    /// the locally-derived ones; the forwarded waypoint and tokens are
    /// kept. The consumed splice entry is deleted.
    async fn splice_bridged_origin(
        &self,
        stores: &CorrelationStores,
        msg: SentJourney,
    ) -> Result<SentJourney, MatchError> {
        let Some(forward_id) = msg.forward_id.clone() else {
            return Ok(msg);
        };
        let chain = msg.origin.chain_id.clone();
        let fid_key = CorrelationKey::new(chain.clone(), forward_id).storage_key();
        let Some(stored) = stores.get::<SentJourney>(NS_BRIDGE, &fid_key).await? else {
            debug!(key = %fid_key, "No bridged origin for forward id");
            return Ok(msg);
        };

        // The original copy is finished: the continuation re-registers the
        // journey under its post-bridge tokens, so every key the original
        // occupied (outbound, hop, bridge) goes now. Its pending sweep then
        // finds nothing and stays silent.
        stores.delete(NS_BRIDGE, &fid_key).await?;
        self.cleanup_journey(stores, &stored).await?;

        debug!(
            origin = %stored.origin.chain_id,
            entry = %chain,
            "Spliced bridged origin into forwarded send"
        );
        Ok(SentJourney {
            origin: stored.origin,
            destination: stored.destination,
            waypoint: msg.waypoint,
            legs: stored.legs,
            sender: stored.sender,
            message_id: msg.message_id,
            forward_id: msg.forward_id,
        })
    }

    /// Match a relay observation stored before its outbound arrived.
    ///
    /// `lookup` supplies the keys (its current leg's recipient, its
    /// destination, its tokens); `journey` is what the notification
    /// carries.
    pub(crate) async fn resolve_relay(
        &self,
        stores: &CorrelationStores,
        lookup: &SentJourney,
        journey: &SentJourney,
    ) -> Result<bool, MatchError> {
        let mut chains: Vec<&ChainId> = Vec::with_capacity(2);
        if let Some(leg) = lookup.legs.get(lookup.waypoint.leg_index) {
            chains.push(&leg.to);
        }
        if !chains.contains(&&lookup.destination.chain_id) {
            chains.push(&lookup.destination.chain_id);
        }

        for chain in chains {
            for token in lookup.tokens() {
                let key = CorrelationKey::new(chain.clone(), token.clone()).storage_key();
                let Some(relay) = stores.get::<RelayedObservation>(NS_RELAY, &key).await? else {
                    continue;
                };
                // Consume every key the observation was stored under.
                let mut ops = Vec::with_capacity(2);
                for relay_token in relay.tokens() {
                    ops.push(BatchOp::delete(
                        NS_RELAY,
                        CorrelationKey::new(chain.clone(), relay_token.clone()).storage_key(),
                    ));
                }
                stores.batch(ops).await?;
                self.emit(JourneyUpdate::Relayed(JourneyRelayed {
                    journey: journey.clone(),
                    relay,
                }))
                .await;
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Single-shot match of a fresh outbound against receipts stored ahead
    /// of it. Returns whether the destination receipt was found.
    pub(crate) async fn match_stored_inbound(
        &self,
        stores: &CorrelationStores,
        journey: &SentJourney,
    ) -> Result<bool, MatchError> {
        for stop in dedup_chains(journey.hop_stops()) {
            for token in journey.tokens() {
                let key = CorrelationKey::new(stop.clone(), token.clone()).storage_key();
                let Some(receipt) = stores.get::<InboundReceipt>(NS_INBOUND, &key).await? else {
                    continue;
                };
                self.consume_receipt(stores, &receipt).await?;
                self.emit(JourneyUpdate::Hop(JourneyHop {
                    journey: journey.clone(),
                    chain_id: stop.clone(),
                    direction: HopDirection::In,
                    block: Some(receipt.block.clone()),
                    outcome: Some(receipt.outcome),
                }))
                .await;
                break;
            }
        }

        for token in journey.tokens() {
            let key =
                CorrelationKey::new(journey.destination.chain_id.clone(), token.clone())
                    .storage_key();
            let Some(receipt) = stores.get::<InboundReceipt>(NS_INBOUND, &key).await? else {
                continue;
            };
            self.consume_receipt(stores, &receipt).await?;
            self.emit(JourneyUpdate::Received(JourneyReceived {
                journey: journey.clone(),
                receipt,
            }))
            .await;
            return Ok(true);
        }
        Ok(false)
    }

    /// Delete every key a stored receipt lives under.
    pub(crate) async fn consume_receipt(
        &self,
        stores: &CorrelationStores,
        receipt: &InboundReceipt,
    ) -> Result<(), MatchError> {
        let mut ops = Vec::with_capacity(2);
        for token in receipt.tokens() {
            ops.push(BatchOp::delete(
                NS_INBOUND,
                CorrelationKey::new(receipt.chain_id.clone(), token.clone()).storage_key(),
            ));
        }
        stores.batch(ops).await
    }

    /// Scan one namespace's entries for a chain and fuzzy-match their legs'
    /// partial payloads against an observed payload.
    pub(crate) async fn scan_for_leg_match(
        &self,
        stores: &CorrelationStores,
        ns: &str,
        chain: &ChainId,
        payload: &[u8],
    ) -> Result<Option<SentJourney>, MatchError> {
        let entries = stores
            .scan::<SentJourney>(ns, CorrelationKey::chain_range(chain))
            .await?;
        for (key, journey) in entries {
            let hit = journey.legs.iter().any(|leg| {
                leg.partial_message
                    .as_ref()
                    .is_some_and(|partial| fuzzy_payload_match(partial.as_bytes(), payload))
            });
            if hit {
                debug!(ns, key = %key, "Heuristic payload match");
                return Ok(Some(journey));
            }
        }
        Ok(None)
    }

    /// Every correlation key a journey occupies.
    fn correlation_keys(journey: &SentJourney) -> Vec<(&'static str, String)> {
        let mut keys = Vec::new();

        for token in journey.tokens() {
            keys.push((
                NS_OUTBOUND,
                CorrelationKey::new(journey.destination.chain_id.clone(), token.clone())
                    .storage_key(),
            ));
        }
        for stop in dedup_chains(journey.hop_stops()) {
            for token in journey.tokens() {
                keys.push((
                    NS_HOP,
                    CorrelationKey::new(stop.clone(), token.clone()).storage_key(),
                ));
            }
        }
        for hub in dedup_chains(journey.bridge_chains()) {
            for token in journey.tokens() {
                keys.push((
                    NS_BRIDGE,
                    CorrelationKey::new(hub.clone(), token.clone()).storage_key(),
                ));
            }
        }
        keys
    }

    /// Persist a journey under all its correlation keys and schedule their
    /// expiry.
    pub(crate) async fn persist_journey(
        &self,
        stores: &CorrelationStores,
        journey: &SentJourney,
        ttl: Option<Duration>,
    ) -> Result<(), MatchError> {
        let value = encode(NS_OUTBOUND, journey)?;
        let expiry = ttl.unwrap_or(self.config.outbound_ttl);
        // The hash is unique per send (a topic id is shared by every send
        // of the journey), so the hash key alone drives the timeout: its
        // sweep deletes the siblings, whose own sweeps then stay silent.
        let timeout_key =
            CorrelationKey::new(journey.destination.chain_id.clone(), journey.hash_token().clone())
                .storage_key();

        let mut ops = Vec::new();
        let mut sweeps = Vec::new();
        for (ns, key) in Self::correlation_keys(journey) {
            ops.push(BatchOp::put(ns, key.clone(), value.clone()));
            match ns {
                NS_OUTBOUND => {
                    if key == timeout_key {
                        sweeps.push(SweepTask::with_expiry(ns, key, expiry));
                    }
                }
                NS_BRIDGE => {
                    sweeps.push(SweepTask::with_expiry(ns, key, self.config.bridge_accepted_ttl));
                }
                _ => sweeps.push(SweepTask::with_expiry(ns, key, expiry)),
            }
        }
        stores.batch(ops).await?;
        self.schedule_sweeps(sweeps);
        debug!(
            destination = %journey.destination.chain_id,
            token = %journey.hash_token(),
            expiry = ?expiry,
            "Journey persisted awaiting receipts"
        );
        Ok(())
    }

    /// Delete every correlation key a journey occupies. Idempotent.
    pub(crate) async fn cleanup_journey(
        &self,
        stores: &CorrelationStores,
        journey: &SentJourney,
    ) -> Result<(), MatchError> {
        let ops = Self::correlation_keys(journey)
            .into_iter()
            .map(|(ns, key)| BatchOp::delete(ns, key))
            .collect();
        stores.batch(ops).await
    }
}

/// Preserve order, drop repeated chains.
fn dedup_chains(chains: Vec<&ChainId>) -> Vec<&ChainId> {
    let mut seen: Vec<&ChainId> = Vec::with_capacity(chains.len());
    for chain in chains {
        if !seen.contains(&chain) {
            seen.push(chain);
        }
    }
    seen
}
