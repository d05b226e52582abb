//! Shared fixtures for the integration flows.

use shared_types::{BlockRef, ChainId, HexPayload, MessageToken, Outcome};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use wp_01_matching_engine::adapters::ChannelSink;
use wp_01_matching_engine::{
    EngineConfig, InboundReceipt, JourneyUpdate, Leg, LegKind, MatchingEngine, RetryPolicy,
    SentJourney, Terminus, TerminusContext, WaypointContext,
};
use wp_02_keyed_store::{KeyedStore, MemoryKeyedStore};
use wp_03_janitor::{Janitor, JanitorConfig};

/// A wired engine with its store and notification channel.
pub struct Tracker {
    pub engine: Arc<MatchingEngine>,
    pub store: Arc<MemoryKeyedStore>,
    pub janitor: Arc<Janitor>,
    pub updates: UnboundedReceiver<JourneyUpdate>,
    pub bus: Arc<shared_bus::InMemoryEventBus>,
}

/// Wire a full tracker over the in-memory store.
pub fn tracker() -> Tracker {
    let store = Arc::new(MemoryKeyedStore::new());
    let janitor = Janitor::with_config(
        store.clone() as Arc<dyn KeyedStore>,
        JanitorConfig::default(),
    );
    let _ = janitor.start();
    let bus = Arc::new(shared_bus::InMemoryEventBus::new());
    let (sink, updates) = ChannelSink::new();
    let engine = MatchingEngine::with_bus(
        store.clone() as Arc<dyn KeyedStore>,
        janitor.clone(),
        Arc::new(sink),
        bus.clone() as Arc<dyn shared_bus::EventPublisher>,
        EngineConfig {
            retry: RetryPolicy {
                attempts: 3,
                base_delay: std::time::Duration::from_millis(1),
            },
            ..EngineConfig::default()
        },
    );
    let _ = engine.start();
    Tracker {
        engine,
        store,
        janitor,
        updates,
        bus,
    }
}

impl Tracker {
    /// Everything emitted so far.
    pub fn drain(&mut self) -> Vec<JourneyUpdate> {
        let mut updates = Vec::new();
        while let Ok(update) = self.updates.try_recv() {
            updates.push(update);
        }
        updates
    }
}

/// Kind labels of a batch of updates.
pub fn kinds(updates: &[JourneyUpdate]) -> Vec<&'static str> {
    updates.iter().map(JourneyUpdate::kind).collect()
}

pub fn leg(from: &str, to: &str, kind: LegKind) -> Leg {
    Leg {
        from: ChainId::from(from),
        to: ChainId::from(to),
        kind,
        relay: None,
        partial_message: None,
    }
}

pub fn journey(
    origin: &str,
    dest: &str,
    legs: Vec<Leg>,
    hash: &str,
    id: Option<&str>,
) -> SentJourney {
    SentJourney {
        origin: TerminusContext {
            chain_id: ChainId::from(origin),
            block: BlockRef::new(format!("0xb-{origin}"), 1),
            outcome: Outcome::Success,
            error: None,
        },
        destination: Terminus::new(dest),
        waypoint: WaypointContext {
            chain_id: ChainId::from(origin),
            block: BlockRef::new(format!("0xb-{origin}"), 1),
            leg_index: 0,
            message_hash: MessageToken::from(hash),
            message_data: None,
        },
        legs,
        sender: None,
        message_id: id.map(MessageToken::from),
        forward_id: None,
    }
}

pub fn receipt(chain: &str, hash: &str, id: Option<&str>) -> InboundReceipt {
    InboundReceipt {
        chain_id: ChainId::from(chain),
        message_hash: MessageToken::from(hash),
        message_id: id.map(MessageToken::from),
        block: BlockRef::new(format!("0xr-{chain}"), 2),
        outcome: Outcome::Success,
        error: None,
        assets_trapped: None,
        message_data: Some(HexPayload::new(vec![0u8; 80])),
    }
}
