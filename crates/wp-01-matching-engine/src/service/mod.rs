//! # Matching Engine Service
//!
//! The correlator. One engine-wide async mutex serializes every
//! store-mutating operation; retry sleeps happen outside the lock so a
//! waiting match never blocks the arrival it is waiting for.

mod bridge;
mod inbound;
mod outbound;
mod relay;
mod stores;


use crate::domain::{JourneyUpdate, MatchError, RetryPolicy, SentJourney};
use crate::ports::NotificationSink;
use shared_bus::{EventPublisher, JourneyEvent};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};
use wp_03_janitor::{Janitor, Sweep};

pub(crate) use stores::CorrelationStores;

/// Namespace of stored outbound journeys, keyed at their destination.
pub const NS_OUTBOUND: &str = "journeys:out";
/// Namespace of receipts awaiting a late outbound.
pub const NS_INBOUND: &str = "journeys:in";
/// Namespace of journeys parked at their intermediate stops.
pub const NS_HOP: &str = "journeys:hop";
/// Namespace of relay observations awaiting their outbound.
pub const NS_RELAY: &str = "journeys:relay";
/// Namespace of bridge-origin journey copies, keyed at the bridge hubs.
pub const NS_BRIDGE: &str = "journeys:bridge";
/// Namespace of accepted-but-unfinished bridge crossings (long expiry).
pub const NS_BRIDGE_ACCEPTED: &str = "journeys:bridge-accepted";
/// Namespace of importing-hub receipts awaiting a late acceptance.
pub const NS_BRIDGE_INBOUND: &str = "journeys:bridge-in";
/// Namespace of the short-lived raw payload cache.
pub const NS_PAYLOADS: &str = "journeys:payloads";

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Expiry of stored outbound and hop entries.
    pub outbound_ttl: Duration,
    /// Expiry of receipts stored awaiting their outbound.
    pub inbound_ttl: Duration,
    /// Expiry of stored relay observations.
    pub relay_ttl: Duration,
    /// Expiry of accepted bridge crossings. Materially longer than the
    /// same-consensus expiries: cross-consensus finality lags hours behind.
    pub bridge_accepted_ttl: Duration,
    /// Expiry of importing-hub receipts stored awaiting acceptance.
    pub bridge_inbound_ttl: Duration,
    /// Expiry of cached raw payloads.
    pub payload_ttl: Duration,
    /// Retry schedule for matches racing their counterpart's store write.
    pub retry: RetryPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            outbound_ttl: Duration::from_secs(2 * 60 * 60),
            inbound_ttl: Duration::from_secs(2 * 60 * 60),
            relay_ttl: Duration::from_secs(30 * 60),
            bridge_accepted_ttl: Duration::from_secs(24 * 60 * 60),
            bridge_inbound_ttl: Duration::from_secs(2 * 60 * 60),
            payload_ttl: Duration::from_secs(5 * 60),
            retry: RetryPolicy::default(),
        }
    }
}

impl EngineConfig {
    /// Read configuration from `WP_*` environment variables, falling back
    /// to defaults field by field.
    ///
    /// # Environment Variables
    ///
    /// - `WP_OUTBOUND_TTL_SECS`
    /// - `WP_INBOUND_TTL_SECS`
    /// - `WP_RELAY_TTL_SECS`
    /// - `WP_BRIDGE_ACCEPTED_TTL_SECS`
    /// - `WP_BRIDGE_INBOUND_TTL_SECS`
    /// - `WP_PAYLOAD_TTL_SECS`
    /// - `WP_MATCH_RETRY_ATTEMPTS`
    /// - `WP_MATCH_RETRY_DELAY_MS`
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            outbound_ttl: env_secs("WP_OUTBOUND_TTL_SECS", defaults.outbound_ttl),
            inbound_ttl: env_secs("WP_INBOUND_TTL_SECS", defaults.inbound_ttl),
            relay_ttl: env_secs("WP_RELAY_TTL_SECS", defaults.relay_ttl),
            bridge_accepted_ttl: env_secs(
                "WP_BRIDGE_ACCEPTED_TTL_SECS",
                defaults.bridge_accepted_ttl,
            ),
            bridge_inbound_ttl: env_secs("WP_BRIDGE_INBOUND_TTL_SECS", defaults.bridge_inbound_ttl),
            payload_ttl: env_secs("WP_PAYLOAD_TTL_SECS", defaults.payload_ttl),
            retry: RetryPolicy {
                attempts: env_u32("WP_MATCH_RETRY_ATTEMPTS", defaults.retry.attempts),
                base_delay: env_millis("WP_MATCH_RETRY_DELAY_MS", defaults.retry.base_delay),
            },
        }
    }
}

fn env_secs(var: &str, default: Duration) -> Duration {
    std::env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .map_or(default, Duration::from_secs)
}

fn env_millis(var: &str, default: Duration) -> Duration {
    std::env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .map_or(default, Duration::from_millis)
}

fn env_u32(var: &str, default: u32) -> u32 {
    std::env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// The journey correlator.
///
/// All state lives in the keyed store; the engine itself only holds the
/// lock, the janitor handle, and the emission targets.
pub struct MatchingEngine {
    /// Store handles, guarded by the engine-wide lock.
    stores: Mutex<CorrelationStores>,
    /// Expiry scheduler for every persisted entry.
    janitor: Arc<Janitor>,
    /// Receiver of unified notifications.
    sink: Arc<dyn NotificationSink>,
    /// Optional observational telemetry bus.
    bus: Option<Arc<dyn EventPublisher>>,
    /// Engine configuration.
    config: EngineConfig,
    /// Set once `stop` is requested; no new operations are accepted.
    stopped: AtomicBool,
}

impl MatchingEngine {
    /// Create an engine over a store and janitor, delivering to `sink`.
    pub fn new(
        store: Arc<dyn wp_02_keyed_store::KeyedStore>,
        janitor: Arc<Janitor>,
        sink: Arc<dyn NotificationSink>,
        config: EngineConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            stores: Mutex::new(CorrelationStores::new(store)),
            janitor,
            sink,
            bus: None,
            config,
            stopped: AtomicBool::new(false),
        })
    }

    /// Create an engine that additionally publishes telemetry events.
    pub fn with_bus(
        store: Arc<dyn wp_02_keyed_store::KeyedStore>,
        janitor: Arc<Janitor>,
        sink: Arc<dyn NotificationSink>,
        bus: Arc<dyn EventPublisher>,
        config: EngineConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            stores: Mutex::new(CorrelationStores::new(store)),
            janitor,
            sink,
            bus: Some(bus),
            config,
            stopped: AtomicBool::new(false),
        })
    }

    /// Engine configuration in effect.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Whether `stop` has been requested.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Spawn the sweep listener feeding janitor expirations back into the
    /// engine as timeout candidates.
    pub fn start(self: &Arc<Self>) -> JoinHandle<()> {
        let engine = Arc::clone(self);
        let mut sweeps = engine.janitor.subscribe();
        tokio::spawn(async move {
            loop {
                match sweeps.recv().await {
                    Ok(sweep) => {
                        if engine.is_stopped() {
                            break;
                        }
                        engine.on_sweep(sweep).await;
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                        warn!(lagged = n, "Sweep listener lagged; sweeps dropped");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
            debug!("Sweep listener stopped");
        })
    }

    /// Guard for entry points: reject operations after stop.
    pub(crate) fn ensure_running(&self) -> Result<(), MatchError> {
        if self.is_stopped() {
            Err(MatchError::Stopped)
        } else {
            Ok(())
        }
    }

    /// Request shutdown and wait for any in-flight correlation to finish.
    pub(crate) async fn shutdown(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        // Taking the lock once guarantees the operation that held it at
        // stop time has completed.
        let _stores = self.stores.lock().await;
        debug!("Matching engine stopped");
    }

    /// A janitor sweep: outbound sweeps with a surviving value become
    /// `Timeout` notifications, everything else is routine cleanup.
    pub(crate) async fn on_sweep(&self, sweep: Sweep) {
        if sweep.task.namespace != NS_OUTBOUND {
            return;
        }
        let Some(bytes) = sweep.last_value else {
            // Already consumed by matching logic; spurious by design.
            return;
        };
        let journey: SentJourney = match stores::decode(NS_OUTBOUND, &bytes) {
            Ok(journey) => journey,
            Err(e) => {
                warn!(key = %sweep.task.key, error = %e, "Swept value failed to decode");
                return;
            }
        };
        {
            let stores = self.stores.lock().await;
            // Drop the journey's sibling keys so their sweeps stay silent
            // and a late receipt finds nothing.
            if let Err(e) = self.cleanup_journey(&stores, &journey).await {
                warn!(key = %sweep.task.key, error = %e, "Timeout cleanup failed");
            }
        }
        debug!(
            origin = %journey.origin.chain_id,
            destination = %journey.destination.chain_id,
            token = %journey.hash_token(),
            "Journey expired unmatched"
        );
        self.emit(JourneyUpdate::Timeout(crate::domain::JourneyTimeout {
            journey,
        }))
        .await;
    }

    /// Deliver one notification to the sink and, best-effort, to the bus.
    ///
    /// Sink failures are logged with the originating payload and never
    /// propagated.
    pub(crate) async fn emit(&self, update: JourneyUpdate) {
        debug!(kind = update.kind(), "Emitting notification");
        if let Err(e) = self.sink.deliver(&update).await {
            error!(kind = update.kind(), error = %e, payload = ?update, "Notification sink failed");
            self.publish_event(JourneyEvent::EngineError {
                operation: "sink".to_string(),
                detail: e.to_string(),
            })
            .await;
        }
        let event = crate::adapters::bus::project(&update);
        self.publish_event(event).await;
    }

    /// Publish one telemetry event when a bus is wired.
    pub(crate) async fn publish_event(&self, event: JourneyEvent) {
        if let Some(bus) = &self.bus {
            bus.publish(event).await;
        }
    }

    /// Schedule janitor sweeps for freshly persisted keys.
    pub(crate) fn schedule_sweeps(&self, tasks: Vec<wp_03_janitor::SweepTask>) {
        self.janitor.schedule(tasks);
    }
}

#[async_trait::async_trait]
impl crate::ports::MatchingApi for MatchingEngine {
    async fn on_message_data(
        &self,
        data: crate::domain::MessageData,
    ) -> Result<(), MatchError> {
        self.handle_message_data(data).await
    }

    async fn on_outbound_message(
        &self,
        msg: SentJourney,
        ttl: Option<Duration>,
    ) -> Result<SentJourney, MatchError> {
        self.handle_outbound(msg, ttl).await
    }

    async fn on_inbound_message(
        &self,
        msg: crate::domain::InboundReceipt,
    ) -> Result<(), MatchError> {
        self.handle_inbound(msg).await
    }

    async fn on_relayed_message(
        &self,
        msg: crate::domain::RelayedObservation,
    ) -> Result<(), MatchError> {
        self.handle_relayed(msg).await
    }

    async fn on_bridge_outbound_accepted(
        &self,
        msg: crate::domain::BridgeOutboundAccepted,
    ) -> Result<(), MatchError> {
        self.handle_bridge_accepted(msg).await
    }

    async fn on_bridge_outbound_delivered(
        &self,
        msg: crate::domain::BridgeOutboundDelivered,
    ) -> Result<(), MatchError> {
        self.handle_bridge_delivered(msg).await
    }

    async fn on_bridge_inbound(
        &self,
        msg: crate::domain::BridgeInbound,
    ) -> Result<(), MatchError> {
        self.handle_bridge_inbound(msg).await
    }

    async fn stop(&self) {
        self.shutdown().await;
    }
}
