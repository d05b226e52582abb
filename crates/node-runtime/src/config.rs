//! Runtime configuration.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Storage backend selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// In-memory store; correlation state dies with the process.
    Memory,
    /// RocksDB-backed store at the given path (requires the `rocksdb`
    /// feature).
    RocksDb(PathBuf),
}

/// Configuration for the tracker runtime.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// NDJSON observation feed; `None` reads stdin.
    pub input: Option<PathBuf>,
    /// Correlation store backend.
    pub storage: StorageBackend,
    /// How long to keep running after the feed ends, so pending expiries
    /// still surface as timeouts. Zero stops at end of input.
    pub linger: Duration,
    /// Dump Prometheus metrics to stderr on shutdown.
    pub dump_metrics: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            input: None,
            storage: StorageBackend::Memory,
            linger: Duration::ZERO,
            dump_metrics: false,
        }
    }
}

impl RuntimeConfig {
    /// Read configuration from the command line and environment.
    ///
    /// The first positional argument is the input path (`-` for stdin).
    ///
    /// # Environment Variables
    ///
    /// - `WP_INPUT`: Observation feed path (overridden by argv)
    /// - `WP_STORAGE`: `memory` (default) or `rocksdb`
    /// - `WP_DB_PATH`: RocksDB directory (default: ./data/waypoint)
    /// - `WP_LINGER_SECS`: Seconds to keep running after end of input
    /// - `WP_DUMP_METRICS`: Dump metrics to stderr on shutdown
    #[must_use]
    pub fn from_env_and_args() -> Self {
        let arg = env::args().nth(1);
        let input = arg
            .or_else(|| env::var("WP_INPUT").ok())
            .filter(|v| v != "-")
            .map(PathBuf::from);

        let storage = match env::var("WP_STORAGE").as_deref() {
            Ok("rocksdb") => StorageBackend::RocksDb(
                env::var("WP_DB_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("./data/waypoint")),
            ),
            _ => StorageBackend::Memory,
        };

        let linger = env::var("WP_LINGER_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map_or(Duration::ZERO, Duration::from_secs);

        let dump_metrics = env::var("WP_DUMP_METRICS")
            .map(|v| v.to_lowercase() == "true" || v == "1")
            .unwrap_or(false);

        Self {
            input,
            storage,
            linger,
            dump_metrics,
        }
    }
}
