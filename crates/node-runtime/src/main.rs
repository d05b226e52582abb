//! # Waypoint Tracker Runtime
//!
//! Replays decoded cross-chain observations into the matching engine and
//! prints unified journey notifications as NDJSON.
//!
//! ## Startup Sequence
//!
//! 1. Initialize telemetry (tracing to stderr, Prometheus registry)
//! 2. Load runtime and engine configuration from the environment
//! 3. Wire store → janitor → bus → engine
//! 4. Replay the observation feed (file or stdin)
//! 5. Optionally linger so pending expiries surface as timeouts
//! 6. Cooperative shutdown
//!
//! ```text
//! $ waypoint observations.ndjson            # replay a capture
//! $ decoder | waypoint -                    # follow a live decode stream
//! $ WP_STORAGE=rocksdb waypoint feed.ndjson # persistent correlation state
//! ```

use anyhow::{Context, Result};
use node_runtime::replay::replay_feed;
use node_runtime::{RuntimeConfig, TrackerRuntime};
use tracing::{info, warn};
use waypoint_telemetry::{init_telemetry, render_metrics, TelemetryConfig};
use wp_01_matching_engine::{EngineConfig, MatchingApi};

#[tokio::main]
async fn main() -> Result<()> {
    let telemetry = TelemetryConfig::from_env();
    init_telemetry(&telemetry).context("telemetry initialization failed")?;

    let config = RuntimeConfig::from_env_and_args();
    let runtime = TrackerRuntime::build(&config, EngineConfig::from_env())
        .context("runtime wiring failed")?;

    let api: &dyn MatchingApi = runtime.engine.as_ref();
    let applied = tokio::select! {
        result = run_feed(&config, api) => result?,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted; shutting down");
            0
        }
    };
    info!(applied, "Observation feed drained");

    if !config.linger.is_zero() {
        info!(linger = ?config.linger, "Lingering for pending expiries");
        tokio::select! {
            () = tokio::time::sleep(config.linger) => {}
            _ = tokio::signal::ctrl_c() => warn!("Interrupted during linger"),
        }
    }

    if config.dump_metrics {
        eprintln!("{}", render_metrics());
    }
    runtime.shutdown().await;
    Ok(())
}

async fn run_feed(config: &RuntimeConfig, api: &dyn MatchingApi) -> Result<u64> {
    let applied = match &config.input {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("cannot open observation feed {}", path.display()))?;
            replay_feed(file, api).await.context("replay failed")?
        }
        None => replay_feed(tokio::io::stdin(), api)
            .await
            .context("replay failed")?,
    };
    Ok(applied)
}
