//! NDJSON observation feed.
//!
//! One decoded observation per line, tagged by kind. This is the boundary a
//! real deployment replaces with live chain decoders; the wire shape is the
//! same either way.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing::{debug, warn};
use waypoint_telemetry::OBSERVATIONS;
use wp_01_matching_engine::{
    BridgeInbound, BridgeOutboundAccepted, BridgeOutboundDelivered, InboundReceipt, MatchingApi,
    MessageData, RelayedObservation, SentJourney,
};

/// One line of the observation feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObservationRecord {
    /// An outbound send, with an optional expiry override in seconds.
    Outbound {
        journey: SentJourney,
        #[serde(default)]
        ttl_secs: Option<u64>,
    },
    /// A receipt at a destination or hop chain.
    Inbound { receipt: InboundReceipt },
    /// A relay-chain observation.
    Relayed { relay: RelayedObservation },
    /// An acceptance at the exporting bridge hub.
    BridgeAccepted { accepted: BridgeOutboundAccepted },
    /// A delivery confirmation at the exporting bridge hub.
    BridgeDelivered { delivered: BridgeOutboundDelivered },
    /// A receipt at the importing bridge hub.
    BridgeInbound { inbound: BridgeInbound },
    /// A raw payload for the message-data cache.
    MessageData { data: MessageData },
}

impl ObservationRecord {
    /// Operation label for metrics.
    #[must_use]
    pub fn operation(&self) -> &'static str {
        match self {
            ObservationRecord::Outbound { .. } => "outbound",
            ObservationRecord::Inbound { .. } => "inbound",
            ObservationRecord::Relayed { .. } => "relayed",
            ObservationRecord::BridgeAccepted { .. } => "bridge_accepted",
            ObservationRecord::BridgeDelivered { .. } => "bridge_delivered",
            ObservationRecord::BridgeInbound { .. } => "bridge_inbound",
            ObservationRecord::MessageData { .. } => "message_data",
        }
    }

    /// Dispatch the observation into the engine.
    pub async fn apply(
        self,
        engine: &dyn MatchingApi,
    ) -> Result<(), wp_01_matching_engine::MatchError> {
        OBSERVATIONS.with_label_values(&[self.operation()]).inc();
        match self {
            ObservationRecord::Outbound { journey, ttl_secs } => {
                engine
                    .on_outbound_message(journey, ttl_secs.map(Duration::from_secs))
                    .await?;
            }
            ObservationRecord::Inbound { receipt } => {
                engine.on_inbound_message(receipt).await?;
            }
            ObservationRecord::Relayed { relay } => {
                engine.on_relayed_message(relay).await?;
            }
            ObservationRecord::BridgeAccepted { accepted } => {
                engine.on_bridge_outbound_accepted(accepted).await?;
            }
            ObservationRecord::BridgeDelivered { delivered } => {
                engine.on_bridge_outbound_delivered(delivered).await?;
            }
            ObservationRecord::BridgeInbound { inbound } => {
                engine.on_bridge_inbound(inbound).await?;
            }
            ObservationRecord::MessageData { data } => {
                engine.on_message_data(data).await?;
            }
        }
        Ok(())
    }
}

/// Replay a feed line by line into the engine.
///
/// Malformed lines are warned about and skipped; a store failure aborts the
/// replay. Returns the number of observations applied.
pub async fn replay_feed<R>(
    reader: R,
    engine: &dyn MatchingApi,
) -> Result<u64, wp_01_matching_engine::MatchError>
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    let mut applied = 0u64;
    let mut line_no = 0u64;
    while let Ok(Some(line)) = lines.next_line().await {
        line_no += 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let record: ObservationRecord = match serde_json::from_str(trimmed) {
            Ok(record) => record,
            Err(e) => {
                warn!(line = line_no, error = %e, "Skipping malformed observation");
                continue;
            }
        };
        debug!(line = line_no, operation = record.operation(), "Applying observation");
        record.apply(engine).await?;
        applied += 1;
    }
    Ok(applied)
}
