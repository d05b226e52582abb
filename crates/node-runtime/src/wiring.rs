//! Composition root: builds the store, janitor, bus, and engine, and owns
//! the background tasks that drain notifications and feed the metrics
//! bridge.

use crate::config::{RuntimeConfig, StorageBackend};
use anyhow::Result;
use shared_bus::{EventFilter, EventTopic, InMemoryEventBus, JourneyEvent};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use waypoint_telemetry::{record_engine_error, record_notification};
use wp_01_matching_engine::adapters::ChannelSink;
use wp_01_matching_engine::{EngineConfig, MatchingApi, MatchingEngine};
use wp_02_keyed_store::{KeyedStore, MemoryKeyedStore};
use wp_03_janitor::Janitor;

/// A fully wired tracker.
pub struct TrackerRuntime {
    /// The matching engine, driven through its inbound port.
    pub engine: Arc<MatchingEngine>,
    /// The expiry scheduler.
    pub janitor: Arc<Janitor>,
    /// The telemetry bus (exposed so hosts can attach observers).
    pub bus: Arc<InMemoryEventBus>,
    tasks: Vec<JoinHandle<()>>,
}

impl TrackerRuntime {
    /// Build and start every component.
    pub fn build(config: &RuntimeConfig, engine_config: EngineConfig) -> Result<Self> {
        let store = open_store(&config.storage)?;
        let janitor = Janitor::new(store.clone());
        janitor.start();

        let bus = Arc::new(InMemoryEventBus::new());
        let (sink, mut updates) = ChannelSink::new();
        let engine = MatchingEngine::with_bus(
            store,
            janitor.clone(),
            Arc::new(sink),
            bus.clone() as Arc<dyn shared_bus::EventPublisher>,
            engine_config,
        );
        engine.start();

        // Notification output: one NDJSON line per journey update.
        let output_task = tokio::spawn(async move {
            while let Some(update) = updates.recv().await {
                match serde_json::to_string(&update) {
                    Ok(line) => println!("{line}"),
                    Err(e) => warn!(error = %e, "Failed to encode notification"),
                }
            }
        });

        // Metrics bridge: bus events become Prometheus counters.
        let mut subscription = bus.subscribe(EventFilter::all());
        let metrics_task = tokio::spawn(async move {
            while let Some(event) = subscription.recv().await {
                match &event {
                    JourneyEvent::EngineError { operation, .. } => {
                        record_engine_error(operation);
                    }
                    other => record_notification(topic_label(other.topic())),
                }
            }
        });

        info!(storage = ?config.storage, "Tracker runtime started");
        Ok(Self {
            engine,
            janitor,
            bus,
            tasks: vec![output_task, metrics_task],
        })
    }

    /// Stop the engine and janitor, drain the output, and tear down the
    /// background tasks.
    pub async fn shutdown(self) {
        MatchingApi::stop(self.engine.as_ref()).await;
        self.janitor.stop();
        // Let the output task drain already-emitted notifications.
        tokio::time::sleep(Duration::from_millis(50)).await;
        for task in self.tasks {
            task.abort();
        }
        info!("Tracker runtime stopped");
    }
}

fn open_store(backend: &StorageBackend) -> Result<Arc<dyn KeyedStore>> {
    match backend {
        StorageBackend::Memory => Ok(Arc::new(MemoryKeyedStore::new())),
        #[cfg(feature = "rocksdb")]
        StorageBackend::RocksDb(path) => {
            use crate::adapters::storage::{RocksDbConfig, RocksDbKeyedStore};
            let store = RocksDbKeyedStore::open(RocksDbConfig::at_path(path.clone()))?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "rocksdb"))]
        StorageBackend::RocksDb(_) => {
            anyhow::bail!("this build has no RocksDB support; rebuild with --features rocksdb")
        }
    }
}

fn topic_label(topic: EventTopic) -> &'static str {
    match topic {
        EventTopic::Sent => "sent",
        EventTopic::Received => "received",
        EventTopic::Relayed => "relayed",
        EventTopic::Hop => "hop",
        EventTopic::Bridge => "bridge",
        EventTopic::Timeout => "timeout",
        EventTopic::Errors | EventTopic::All => "other",
    }
}
