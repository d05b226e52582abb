//! # Event Publisher
//!
//! Defines the publishing side of the telemetry bus.

use crate::events::{EventFilter, JourneyEvent};
use crate::subscriber::{EventStream, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

/// Trait for publishing events to the bus.
///
/// This is the only interface the matching engine holds; swapping the bus
/// out (or wiring none at all) never changes correlation behavior.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an event to the bus.
    ///
    /// # Returns
    ///
    /// The number of active subscribers that received the event.
    async fn publish(&self, event: JourneyEvent) -> usize;

    /// Get the total number of events published.
    fn events_published(&self) -> u64;
}

/// In-memory implementation of the telemetry bus.
///
/// Uses `tokio::sync::broadcast` for multi-producer, multi-consumer
/// semantics. Suitable for single-process operation; a distributed
/// deployment would put an MQTT/Redis implementation behind the same trait.
pub struct InMemoryEventBus {
    /// Broadcast sender for events.
    sender: broadcast::Sender<JourneyEvent>,

    /// Active subscriptions by id (for observability).
    subscriptions: Arc<RwLock<HashMap<Uuid, EventFilter>>>,

    /// Total events published.
    events_published: AtomicU64,

    /// Channel capacity.
    capacity: usize,
}

impl InMemoryEventBus {
    /// Create a new in-memory event bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new in-memory event bus with specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            subscriptions: Arc::new(RwLock::new(HashMap::new())),
            events_published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Subscribe to events matching a filter.
    ///
    /// Returns a `Subscription` handle that can be used to receive events.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        let receiver = self.sender.subscribe();
        let id = Uuid::new_v4();

        if let Ok(mut subs) = self.subscriptions.write() {
            subs.insert(id, filter.clone());
        }

        debug!(subscription = %id, topics = ?filter.topics, "New subscription created");

        Subscription::new(id, receiver, filter, self.subscriptions.clone())
    }

    /// Get a stream of events matching a filter.
    #[must_use]
    pub fn event_stream(&self, filter: EventFilter) -> EventStream {
        EventStream::new(self.subscribe(filter))
    }

    /// Get the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Get the channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: JourneyEvent) -> usize {
        self.events_published.fetch_add(1, Ordering::Relaxed);
        // An Err only means there are no subscribers right now.
        match self.sender.send(event) {
            Ok(receivers) => receivers,
            Err(_) => 0,
        }
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}
