//! Inbound correlation flow and the raw payload cache.

use super::stores::CorrelationStores;
use super::{MatchingEngine, NS_HOP, NS_INBOUND, NS_OUTBOUND, NS_PAYLOADS};
use crate::domain::{
    CorrelationKey, InboundReceipt, JourneyHop, JourneyReceived, JourneyUpdate, MatchError,
    MessageData,
};
use shared_types::HopDirection;
use tracing::debug;
use wp_03_janitor::SweepTask;

impl MatchingEngine {
    /// Cache a raw payload under its hash and topic id so receipts that
    /// arrive without one can backfill it.
    pub(crate) async fn handle_message_data(&self, data: MessageData) -> Result<(), MatchError> {
        self.ensure_running()?;
        let stores = self.stores.lock().await;

        let mut keys = vec![data.message_hash.as_str().to_string()];
        if let Some(topic) = data
            .topic_id
            .as_ref()
            .filter(|topic| *topic != &data.message_hash)
        {
            keys.push(topic.as_str().to_string());
        }
        let mut sweeps = Vec::with_capacity(keys.len());
        for key in &keys {
            stores.put(NS_PAYLOADS, key, &data).await?;
            sweeps.push(SweepTask::with_expiry(
                NS_PAYLOADS,
                key.clone(),
                self.config.payload_ttl,
            ));
        }
        self.schedule_sweeps(sweeps);
        drop(stores);
        tokio::task::yield_now().await;
        Ok(())
    }

    /// Correlate an observed receipt.
    ///
    /// The match is retried with the configured backoff: a receipt is
    /// routinely persisted fractionally before its outbound's store write
    /// completes. Sleeps happen outside the lock so the outbound write can
    /// land between attempts.
    pub(crate) async fn handle_inbound(&self, mut msg: InboundReceipt) -> Result<(), MatchError> {
        self.ensure_running()?;

        if msg.message_data.is_none() {
            self.backfill_payload(&mut msg).await?;
        }

        let policy = self.config.retry;
        let mut attempt = 0;
        loop {
            {
                let stores = self.stores.lock().await;
                if self.try_match_inbound(&stores, &msg).await? {
                    return Ok(());
                }
            }
            match policy.delay_after(attempt) {
                Some(delay) => tokio::time::sleep(delay).await,
                None => break,
            }
            attempt += 1;
        }

        // Store-and-wait: a later outbound will find the receipt.
        let stores = self.stores.lock().await;
        let mut sweeps = Vec::with_capacity(2);
        for token in msg.tokens() {
            let key = CorrelationKey::new(msg.chain_id.clone(), token.clone()).storage_key();
            stores.put(NS_INBOUND, &key, &msg).await?;
            sweeps.push(SweepTask::with_expiry(
                NS_INBOUND,
                key,
                self.config.inbound_ttl,
            ));
        }
        self.schedule_sweeps(sweeps);
        debug!(
            chain = %msg.chain_id,
            token = %msg.message_hash,
            "Receipt persisted awaiting its outbound"
        );
        drop(stores);
        tokio::task::yield_now().await;
        Ok(())
    }

    /// Backfill a receipt's payload from the cache, retrying briefly since
    /// payload and receipt events arrive in no particular order.
    async fn backfill_payload(&self, msg: &mut InboundReceipt) -> Result<(), MatchError> {
        let policy = self.config.retry;
        let mut attempt = 0;
        loop {
            {
                let stores = self.stores.lock().await;
                for token in msg.tokens().into_iter().cloned().collect::<Vec<_>>() {
                    let Some(record) = stores
                        .get::<MessageData>(NS_PAYLOADS, token.as_str())
                        .await?
                    else {
                        continue;
                    };
                    msg.message_data = Some(record.data);
                    // A cached topic id enriches a hash-only receipt.
                    if msg.message_id.is_none() {
                        msg.message_id = record.topic_id;
                    }
                    return Ok(());
                }
            }
            match policy.delay_after(attempt) {
                Some(delay) => tokio::time::sleep(delay).await,
                None => return Ok(()),
            }
            attempt += 1;
        }
    }

    /// One locked match attempt: exact hop, exact outbound, then the
    /// heuristics over both namespaces.
    async fn try_match_inbound(
        &self,
        stores: &CorrelationStores,
        msg: &InboundReceipt,
    ) -> Result<bool, MatchError> {
        // Exact hop match: this chain is an intermediate stop.
        for token in msg.tokens() {
            let key = CorrelationKey::new(msg.chain_id.clone(), token.clone()).storage_key();
            if let Some(journey) = stores.get(NS_HOP, &key).await? {
                // The hop key stays until the journey completes; the
                // outbound half of this stop may not have arrived yet.
                self.emit_hop_in(journey, msg).await;
                return Ok(true);
            }
        }

        // Exact outbound match: this chain is the journey's destination.
        for token in msg.tokens() {
            let key = CorrelationKey::new(msg.chain_id.clone(), token.clone()).storage_key();
            if let Some(journey) = stores.get(NS_OUTBOUND, &key).await? {
                self.cleanup_journey(stores, &journey).await?;
                self.emit(JourneyUpdate::Received(JourneyReceived {
                    journey,
                    receipt: msg.clone(),
                }))
                .await;
                return Ok(true);
            }
        }

        // Heuristic fallback when an older-revision payload carries no
        // topic id.
        if let Some(payload) = &msg.message_data {
            if let Some(journey) = self
                .scan_for_leg_match(stores, NS_HOP, &msg.chain_id, payload.as_bytes())
                .await?
            {
                self.emit_hop_in(journey, msg).await;
                return Ok(true);
            }
            if let Some(journey) = self
                .scan_for_leg_match(stores, NS_OUTBOUND, &msg.chain_id, payload.as_bytes())
                .await?
            {
                self.cleanup_journey(stores, &journey).await?;
                self.emit(JourneyUpdate::Received(JourneyReceived {
                    journey,
                    receipt: msg.clone(),
                }))
                .await;
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn emit_hop_in(&self, journey: crate::domain::SentJourney, msg: &InboundReceipt) {
        self.emit(JourneyUpdate::Hop(JourneyHop {
            journey,
            chain_id: msg.chain_id.clone(),
            direction: HopDirection::In,
            block: Some(msg.block.clone()),
            outcome: Some(msg.outcome),
        }))
        .await;
    }
}
