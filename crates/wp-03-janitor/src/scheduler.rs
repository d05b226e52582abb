//! Sweep scheduling.

use parking_lot::Mutex;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Notify};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};
use wp_02_keyed_store::KeyedStore;

/// Default expiry applied when a task does not carry its own.
pub const DEFAULT_SWEEP_EXPIRY: Duration = Duration::from_secs(2 * 60 * 60);

/// Maximum sweeps buffered per subscriber before backpressure drops.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// A scheduled deletion of one store entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepTask {
    /// Store namespace of the entry.
    pub namespace: String,
    /// Key of the entry within the namespace.
    pub key: String,
    /// Expiry override; the janitor default applies when `None`.
    pub expiry: Option<Duration>,
}

impl SweepTask {
    /// Create a task with the janitor's default expiry.
    pub fn new(namespace: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            key: key.into(),
            expiry: None,
        }
    }

    /// Create a task with an explicit expiry.
    pub fn with_expiry(
        namespace: impl Into<String>,
        key: impl Into<String>,
        expiry: Duration,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            key: key.into(),
            expiry: Some(expiry),
        }
    }
}

/// Notification emitted when a scheduled deletion fires.
#[derive(Debug, Clone)]
pub struct Sweep {
    /// The task that fired.
    pub task: SweepTask,
    /// Value held by the entry just before deletion; `None` when matching
    /// logic already consumed it.
    pub last_value: Option<Vec<u8>>,
}

/// Janitor configuration.
#[derive(Debug, Clone)]
pub struct JanitorConfig {
    /// Expiry applied to tasks without their own.
    pub default_expiry: Duration,
    /// Broadcast channel capacity for sweep subscribers.
    pub channel_capacity: usize,
}

impl Default for JanitorConfig {
    fn default() -> Self {
        Self {
            default_expiry: DEFAULT_SWEEP_EXPIRY,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

/// Deadline-ordered heap entry.
struct Scheduled {
    due: Instant,
    task: SweepTask,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap, we pop the earliest deadline.
        other.due.cmp(&self.due)
    }
}

/// Scheduled-deletion service over the keyed store.
///
/// One background task owns the deadline heap. `schedule` is cheap: it
/// pushes onto the heap and wakes the runner, which sleeps until the next
/// deadline.
pub struct Janitor {
    store: Arc<dyn KeyedStore>,
    config: JanitorConfig,
    queue: Mutex<BinaryHeap<Scheduled>>,
    wakeup: Notify,
    sweeps_tx: broadcast::Sender<Sweep>,
    sweeps_fired: AtomicU64,
    stopped: AtomicBool,
}

impl Janitor {
    /// Create a janitor over a store with default configuration.
    pub fn new(store: Arc<dyn KeyedStore>) -> Arc<Self> {
        Self::with_config(store, JanitorConfig::default())
    }

    /// Create a janitor with explicit configuration.
    pub fn with_config(store: Arc<dyn KeyedStore>, config: JanitorConfig) -> Arc<Self> {
        let (sweeps_tx, _) = broadcast::channel(config.channel_capacity);
        Arc::new(Self {
            store,
            config,
            queue: Mutex::new(BinaryHeap::new()),
            wakeup: Notify::new(),
            sweeps_tx,
            sweeps_fired: AtomicU64::new(0),
            stopped: AtomicBool::new(false),
        })
    }

    /// Schedule deletion of the given entries after their expiry elapses.
    pub fn schedule(&self, tasks: Vec<SweepTask>) {
        if tasks.is_empty() || self.stopped.load(AtomicOrdering::SeqCst) {
            return;
        }
        let now = Instant::now();
        {
            let mut queue = self.queue.lock();
            for task in tasks {
                let expiry = task.expiry.unwrap_or(self.config.default_expiry);
                queue.push(Scheduled {
                    due: now + expiry,
                    task,
                });
            }
        }
        self.wakeup.notify_one();
    }

    /// Subscribe to sweep notifications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Sweep> {
        self.sweeps_tx.subscribe()
    }

    /// Total sweeps fired since startup.
    #[must_use]
    pub fn sweeps_fired(&self) -> u64 {
        self.sweeps_fired.load(AtomicOrdering::SeqCst)
    }

    /// Number of tasks currently awaiting their deadline.
    #[must_use]
    pub fn pending_tasks(&self) -> usize {
        self.queue.lock().len()
    }

    /// Spawn the background sweep loop.
    pub fn start(self: &Arc<Self>) -> JoinHandle<()> {
        let janitor = Arc::clone(self);
        tokio::spawn(async move { janitor.run().await })
    }

    /// Request shutdown; the running loop exits at its next wakeup.
    pub fn stop(&self) {
        self.stopped.store(true, AtomicOrdering::SeqCst);
        self.wakeup.notify_one();
    }

    async fn run(self: Arc<Self>) {
        debug!(default_expiry = ?self.config.default_expiry, "Janitor started");
        while !self.stopped.load(AtomicOrdering::SeqCst) {
            let next_due = self.queue.lock().peek().map(|s| s.due);
            match next_due {
                Some(due) => {
                    tokio::select! {
                        () = tokio::time::sleep_until(due) => self.sweep_due().await,
                        () = self.wakeup.notified() => {}
                    }
                }
                None => self.wakeup.notified().await,
            }
        }
        debug!("Janitor stopped");
    }

    /// Fire every task whose deadline has passed.
    async fn sweep_due(&self) {
        loop {
            let scheduled = {
                let mut queue = self.queue.lock();
                match queue.peek() {
                    Some(s) if s.due <= Instant::now() => queue.pop(),
                    _ => None,
                }
            };
            let Some(Scheduled { task, .. }) = scheduled else {
                break;
            };
            self.fire(task).await;
        }
    }

    /// Delete one entry and notify subscribers with its last-known value.
    async fn fire(&self, task: SweepTask) {
        let last_value = match self.store.get(&task.namespace, &task.key).await {
            Ok(value) => value,
            Err(e) => {
                warn!(ns = %task.namespace, key = %task.key, error = %e, "Sweep read failed");
                None
            }
        };
        if last_value.is_some() {
            if let Err(e) = self.store.delete(&task.namespace, &task.key).await {
                warn!(ns = %task.namespace, key = %task.key, error = %e, "Sweep delete failed");
            }
        }
        self.sweeps_fired.fetch_add(1, AtomicOrdering::SeqCst);
        debug!(
            ns = %task.namespace,
            key = %task.key,
            consumed = last_value.is_none(),
            "Sweep fired"
        );
        // No subscribers is fine; sweeps are best-effort.
        let _ = self.sweeps_tx.send(Sweep { task, last_value });
    }
}
