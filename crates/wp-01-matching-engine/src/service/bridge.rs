//! Bridge correlation flow: three-way accepted / delivered / inbound
//! matching on the channel+nonce bridge key.

use super::{MatchingEngine, NS_BRIDGE, NS_BRIDGE_ACCEPTED, NS_BRIDGE_INBOUND};
use crate::domain::bridge::BridgeCorrelation;
use crate::domain::{
    BridgeInbound, BridgeOutboundAccepted, BridgeOutboundDelivered, CorrelationKey, JourneyBridge,
    JourneyUpdate, MatchError, SentJourney,
};
use shared_bus::JourneyEvent;
use shared_types::BridgeStage;
use tracing::{debug, error};
use wp_02_keyed_store::BatchOp;
use wp_03_janitor::SweepTask;

impl MatchingEngine {
    /// Correlate an acceptance at the exporting bridge hub.
    pub(crate) async fn handle_bridge_accepted(
        &self,
        msg: BridgeOutboundAccepted,
    ) -> Result<(), MatchError> {
        self.ensure_running()?;
        let Some(forward_id) = msg.forward_id.clone() else {
            // A missing correlation field cannot self-correct; drop it.
            error!(
                chain = %msg.chain_id,
                bridge_key = %msg.bridge_key,
                "Bridge acceptance missing forward id; dropped"
            );
            self.publish_event(JourneyEvent::EngineError {
                operation: "on_bridge_outbound_accepted".to_string(),
                detail: format!("missing forward id for bridge key {}", msg.bridge_key),
            })
            .await;
            return Ok(());
        };

        let stores = self.stores.lock().await;
        let bridge_key = msg.bridge_key.as_str().to_string();

        if stores
            .exists(NS_BRIDGE_ACCEPTED, &bridge_key)
            .await?
        {
            debug!(bridge_key = %bridge_key, "Duplicate bridge acceptance dropped");
            return Ok(());
        }

        // Pick up the origin journey parked at this hub, consuming this
        // hub's copy; the importing hub keeps its own for the forward
        // splice.
        let fid_key =
            CorrelationKey::new(msg.chain_id.clone(), forward_id.clone()).storage_key();
        let journey = stores.get::<SentJourney>(NS_BRIDGE, &fid_key).await?;
        if let Some(journey) = &journey {
            let mut ops = vec![BatchOp::delete(NS_BRIDGE, fid_key.clone())];
            for token in journey.tokens() {
                let key =
                    CorrelationKey::new(msg.chain_id.clone(), token.clone()).storage_key();
                if key != fid_key {
                    ops.push(BatchOp::delete(NS_BRIDGE, key));
                }
            }
            stores.batch(ops).await?;
        }

        let entry = BridgeCorrelation {
            accepted: msg.clone(),
            journey,
            delivered: false,
        };
        stores.put(NS_BRIDGE_ACCEPTED, &bridge_key, &entry).await?;
        self.schedule_sweeps(vec![SweepTask::with_expiry(
            NS_BRIDGE_ACCEPTED,
            bridge_key.clone(),
            self.config.bridge_accepted_ttl,
        )]);

        self.emit(JourneyUpdate::Bridge(JourneyBridge {
            stage: BridgeStage::Accepted,
            chain_id: msg.chain_id.clone(),
            bridge_key: msg.bridge_key.clone(),
            journey: entry.journey.clone(),
            inbound: None,
            block: msg.block.clone(),
        }))
        .await;

        // The importing hub may have raced ahead of the acceptance.
        if let Some(inbound) = stores
            .get::<BridgeInbound>(NS_BRIDGE_INBOUND, &bridge_key)
            .await?
        {
            stores
                .batch(vec![
                    BatchOp::delete(NS_BRIDGE_INBOUND, bridge_key.clone()),
                    BatchOp::delete(NS_BRIDGE_ACCEPTED, bridge_key.clone()),
                ])
                .await?;
            self.emit(JourneyUpdate::Bridge(JourneyBridge {
                stage: BridgeStage::Received,
                chain_id: inbound.chain_id.clone(),
                bridge_key: inbound.bridge_key.clone(),
                journey: entry.journey.clone(),
                inbound: Some(inbound.clone()),
                block: inbound.block.clone(),
            }))
            .await;
        }
        drop(stores);
        tokio::task::yield_now().await;
        Ok(())
    }

    /// Correlate a delivery confirmation at the exporting bridge hub.
    pub(crate) async fn handle_bridge_delivered(
        &self,
        msg: BridgeOutboundDelivered,
    ) -> Result<(), MatchError> {
        self.ensure_running()?;
        if msg.forward_id.is_none() {
            error!(
                chain = %msg.chain_id,
                bridge_key = %msg.bridge_key,
                "Bridge delivery missing forward id; dropped"
            );
            self.publish_event(JourneyEvent::EngineError {
                operation: "on_bridge_outbound_delivered".to_string(),
                detail: format!("missing forward id for bridge key {}", msg.bridge_key),
            })
            .await;
            return Ok(());
        }

        let stores = self.stores.lock().await;
        let bridge_key = msg.bridge_key.as_str().to_string();
        let Some(mut entry) = stores
            .get::<BridgeCorrelation>(NS_BRIDGE_ACCEPTED, &bridge_key)
            .await?
        else {
            // Deliveries always follow an acceptance on the same hub; an
            // unknown key is stale state from before a restart.
            debug!(bridge_key = %bridge_key, "Delivery for unknown bridge acceptance dropped");
            return Ok(());
        };

        self.emit(JourneyUpdate::Bridge(JourneyBridge {
            stage: BridgeStage::Delivered,
            chain_id: msg.chain_id.clone(),
            bridge_key: msg.bridge_key.clone(),
            journey: entry.journey.clone(),
            inbound: None,
            block: msg.block.clone(),
        }))
        .await;

        // Full overwrite; entries are never mutated in place.
        entry.delivered = true;
        stores.put(NS_BRIDGE_ACCEPTED, &bridge_key, &entry).await?;
        drop(stores);
        tokio::task::yield_now().await;
        Ok(())
    }

    /// Correlate a receipt at the importing bridge hub.
    pub(crate) async fn handle_bridge_inbound(&self, msg: BridgeInbound) -> Result<(), MatchError> {
        self.ensure_running()?;
        let stores = self.stores.lock().await;
        let bridge_key = msg.bridge_key.as_str().to_string();

        if let Some(entry) = stores
            .get::<BridgeCorrelation>(NS_BRIDGE_ACCEPTED, &bridge_key)
            .await?
        {
            stores.delete(NS_BRIDGE_ACCEPTED, &bridge_key).await?;
            self.emit(JourneyUpdate::Bridge(JourneyBridge {
                stage: BridgeStage::Received,
                chain_id: msg.chain_id.clone(),
                bridge_key: msg.bridge_key.clone(),
                journey: entry.journey.clone(),
                inbound: Some(msg.clone()),
                block: msg.block.clone(),
            }))
            .await;
        } else {
            // Out-of-order: park the receipt until the acceptance lands.
            stores.put(NS_BRIDGE_INBOUND, &bridge_key, &msg).await?;
            self.schedule_sweeps(vec![SweepTask::with_expiry(
                NS_BRIDGE_INBOUND,
                bridge_key.clone(),
                self.config.bridge_inbound_ttl,
            )]);
            debug!(
                chain = %msg.chain_id,
                bridge_key = %bridge_key,
                "Bridge receipt persisted awaiting acceptance"
            );
        }
        drop(stores);
        tokio::task::yield_now().await;
        Ok(())
    }
}
