//! # Shared Bus - Telemetry Event Fan-Out
//!
//! Broadcast bus carrying one observational event per journey notification
//! the matching engine emits, plus engine error events.
//!
//! ## Role
//!
//! The bus is decoupled from the receiver callback on purpose: delivery to
//! downstream consumers goes through the engine's `NotificationSink`, while
//! the bus exists for dashboards, metrics bridges, and tests that want to
//! observe the correlator without sitting in its delivery path. No consumer
//! is required for correctness.
//!
//! ```text
//! ┌──────────────────┐   publish()   ┌──────────────┐   subscribe()
//! │ Matching Engine  │ ────────────► │  Event Bus   │ ───────────► observers
//! └──────────────────┘               └──────────────┘
//! ```
//!
//! Slow observers lag and drop events rather than backpressure the engine.

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{EventFilter, EventTopic, JourneyEvent};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, EventSubscriber, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before backpressure.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
