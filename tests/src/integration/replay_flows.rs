//! The runtime's replay boundary: NDJSON observations in, correlated
//! notifications out.

use super::fixtures::{journey, kinds, leg, tracker};
use node_runtime::replay::{replay_feed, ObservationRecord};
use wp_01_matching_engine::{LegKind, MatchingApi};

const FEED: &str = r#"
# A two-chain journey delivered out of order, plus noise.
{"type":"inbound","receipt":{"chain_id":"B","message_hash":"0xAA","message_id":"0x11","block":{"hash":"0xr1","number":9},"outcome":"success","message_data":"0x00"}}
not even json
{"type":"mystery","payload":{}}
{"type":"outbound","journey":{"origin":{"chain_id":"A","block":{"hash":"0xb1","number":5},"outcome":"success"},"destination":{"chain_id":"B"},"waypoint":{"chain_id":"A","block":{"hash":"0xb1","number":5},"leg_index":0,"message_hash":"0xAA"},"legs":[{"from":"A","to":"B","kind":"hrmp"}],"message_id":"0x11"}}
"#;

#[tokio::test(start_paused = true)]
async fn replay_correlates_and_skips_malformed_lines() {
    let mut t = tracker();
    let api: &dyn MatchingApi = t.engine.as_ref();

    let applied = replay_feed(FEED.as_bytes(), api).await.unwrap();
    assert_eq!(applied, 2, "two well-formed observations");

    assert_eq!(kinds(&t.drain()), vec!["sent", "received"]);
    assert_eq!(t.store.entry_count("journeys:out"), 0);
    assert_eq!(t.store.entry_count("journeys:in"), 0);
}

#[tokio::test(start_paused = true)]
async fn replayed_outbound_honors_ttl_override() {
    let mut t = tracker();
    let api: &dyn MatchingApi = t.engine.as_ref();

    let record = ObservationRecord::Outbound {
        journey: journey("A", "B", vec![leg("A", "B", LegKind::Hrmp)], "0xAA", None),
        ttl_secs: Some(1),
    };
    let feed = serde_json::to_string(&record).unwrap();
    replay_feed(feed.as_bytes(), api).await.unwrap();
    assert_eq!(kinds(&t.drain()), vec!["sent"]);

    let update = t.updates.recv().await.expect("timeout notification");
    assert_eq!(update.kind(), "timeout", "1s override beat the default ttl");
}
