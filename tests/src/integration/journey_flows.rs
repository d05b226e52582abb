//! End-to-end correlation flows over the real store, janitor, and bus.

use super::fixtures::{journey, kinds, leg, receipt, tracker};
use rand::Rng;
use shared_bus::{EventFilter, EventPublisher, EventTopic, JourneyEvent};
use shared_types::{ChainId, HexPayload, HopDirection, MessageToken};
use std::sync::Arc;
use std::time::Duration;
use wp_01_matching_engine::ports::{NotificationSink, SinkError};
use wp_01_matching_engine::{
    EngineConfig, JourneyUpdate, LegKind, MatchingApi, MatchingEngine,
};
use wp_02_keyed_store::{KeyedStore, MemoryKeyedStore};
use wp_03_janitor::Janitor;

/// The canonical three-chain scenario: a journey A→B→C observed as four
/// partial events, correlated into hop(in), hop(out), and received.
#[tokio::test(start_paused = true)]
async fn hop_journey_correlates_across_three_chains() {
    let mut t = tracker();
    let legs = vec![leg("A", "B", LegKind::Hop), leg("B", "C", LegKind::Hrmp)];

    // Outbound at A: hop keys B:0x11 and B:0xAA are parked.
    t.engine
        .on_outbound_message(journey("A", "C", legs.clone(), "0xAA", Some("0x11")), None)
        .await
        .unwrap();
    assert_eq!(kinds(&t.drain()), vec!["sent"]);

    // Inbound at B matches the hop key; no deletion yet.
    t.engine
        .on_inbound_message(receipt("B", "0xAA", Some("0x11")))
        .await
        .unwrap();
    let updates = t.drain();
    assert_eq!(kinds(&updates), vec!["hop"]);
    match &updates[0] {
        JourneyUpdate::Hop(hop) => {
            assert_eq!(hop.direction, HopDirection::In);
            assert_eq!(hop.chain_id, ChainId::from("B"));
        }
        other => panic!("unexpected update: {other:?}"),
    }

    // Outbound at B (fresh hash, same topic) matches the same hop key.
    t.engine
        .on_outbound_message(
            journey("B", "C", vec![leg("B", "C", LegKind::Hrmp)], "0xBB", Some("0x11")),
            None,
        )
        .await
        .unwrap();
    let updates = t.drain();
    assert_eq!(kinds(&updates), vec!["hop"]);
    match &updates[0] {
        JourneyUpdate::Hop(hop) => assert_eq!(hop.direction, HopDirection::Out),
        other => panic!("unexpected update: {other:?}"),
    }

    // Inbound at C completes the journey and clears every key.
    t.engine
        .on_inbound_message(receipt("C", "0xBB", Some("0x11")))
        .await
        .unwrap();
    let updates = t.drain();
    assert_eq!(kinds(&updates), vec!["received"]);
    match &updates[0] {
        JourneyUpdate::Received(received) => {
            assert_eq!(received.journey.legs, legs, "legs preserved end to end");
            assert_eq!(received.journey.origin.chain_id, ChainId::from("A"));
        }
        other => panic!("unexpected update: {other:?}"),
    }
    assert_eq!(t.store.entry_count("journeys:out"), 0);
    assert_eq!(t.store.entry_count("journeys:hop"), 0);
    assert_eq!(t.store.entry_count("journeys:in"), 0);
}

/// Either arrival order produces exactly one `Received`, with no residual
/// correlation state.
#[tokio::test(start_paused = true)]
async fn order_independence_for_sent_inbound_pairs() {
    for inbound_first in [false, true] {
        let mut t = tracker();
        let msg = journey(
            "A",
            "B",
            vec![leg("A", "B", LegKind::Hrmp)],
            "0xAB",
            Some("0x77"),
        );
        let rec = receipt("B", "0xAB", Some("0x77"));

        if inbound_first {
            t.engine.on_inbound_message(rec).await.unwrap();
            t.engine.on_outbound_message(msg, None).await.unwrap();
        } else {
            t.engine.on_outbound_message(msg, None).await.unwrap();
            t.engine.on_inbound_message(rec).await.unwrap();
        }

        let received: Vec<_> = t
            .drain()
            .into_iter()
            .filter(|u| u.kind() == "received")
            .collect();
        assert_eq!(
            received.len(),
            1,
            "exactly one received (inbound_first={inbound_first})"
        );
        assert_eq!(t.store.entry_count("journeys:out"), 0);
        assert_eq!(t.store.entry_count("journeys:in"), 0);
    }
}

/// Concurrent arrivals for distinct journeys all correlate; the engine
/// lock serializes them without losing updates.
#[tokio::test]
async fn concurrent_journeys_all_complete() {
    let mut t = tracker();
    const JOURNEYS: usize = 24;

    let mut handles = Vec::new();
    for i in 0..JOURNEYS {
        let engine = t.engine.clone();
        let hash = format!("0xaa{i:02x}");
        let topic = format!("0x11{i:02x}");
        let jitter = rand::thread_rng().gen_range(0..5);
        handles.push(tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(jitter)).await;
            let msg = journey(
                "A",
                "B",
                vec![leg("A", "B", LegKind::Hrmp)],
                &hash,
                Some(&topic),
            );
            let rec = receipt("B", &hash, Some(&topic));
            // Half the journeys deliver the receipt first.
            if i % 2 == 0 {
                engine.on_inbound_message(rec).await.unwrap();
                engine.on_outbound_message(msg, None).await.unwrap();
            } else {
                engine.on_outbound_message(msg, None).await.unwrap();
                engine.on_inbound_message(rec).await.unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let updates = t.drain();
    let received = updates.iter().filter(|u| u.kind() == "received").count();
    let sent = updates.iter().filter(|u| u.kind() == "sent").count();
    assert_eq!(received, JOURNEYS);
    assert_eq!(sent, JOURNEYS);
    assert_eq!(t.store.entry_count("journeys:out"), 0);
    assert_eq!(t.store.entry_count("journeys:in"), 0);
}

/// An unmatched journey expires into exactly one timeout, visible on both
/// the sink and the telemetry bus.
#[tokio::test(start_paused = true)]
async fn expiry_surfaces_once_on_sink_and_bus() {
    let mut t = tracker();
    let mut timeouts = t.bus.subscribe(EventFilter::topics(vec![EventTopic::Timeout]));

    t.engine
        .on_outbound_message(
            journey(
                "A",
                "B",
                vec![leg("A", "B", LegKind::Hrmp)],
                "0xAA",
                Some("0x11"),
            ),
            Some(Duration::from_millis(20)),
        )
        .await
        .unwrap();
    assert_eq!(kinds(&t.drain()), vec!["sent"]);

    let update = t.updates.recv().await.expect("timeout notification");
    assert_eq!(update.kind(), "timeout");

    let event = timeouts.recv().await.expect("timeout event");
    match event {
        JourneyEvent::Timeout { token, .. } => {
            assert_eq!(token, MessageToken::from("0x11"));
        }
        other => panic!("unexpected event: {other:?}"),
    }

    // A late receipt emits nothing further.
    t.engine
        .on_inbound_message(receipt("B", "0xAA", Some("0x11")))
        .await
        .unwrap();
    assert!(t.drain().is_empty());
}

/// A receiver that fails on every delivery never disturbs correlation:
/// state still advances and is cleaned up.
#[tokio::test(start_paused = true)]
async fn failing_receiver_is_isolated() {
    struct FailingSink;

    #[async_trait::async_trait]
    impl NotificationSink for FailingSink {
        async fn deliver(&self, _update: &JourneyUpdate) -> Result<(), SinkError> {
            Err(SinkError::new("downstream exploded"))
        }
    }

    let store = Arc::new(MemoryKeyedStore::new());
    let janitor = Janitor::new(store.clone() as Arc<dyn KeyedStore>);
    let _ = janitor.start();
    let engine = MatchingEngine::new(
        store.clone() as Arc<dyn KeyedStore>,
        janitor,
        Arc::new(FailingSink),
        EngineConfig::default(),
    );
    let _ = engine.start();

    engine
        .on_outbound_message(
            journey("A", "B", vec![leg("A", "B", LegKind::Hrmp)], "0xAA", None),
            None,
        )
        .await
        .expect("sink failure must not surface");
    engine
        .on_inbound_message(receipt("B", "0xAA", None))
        .await
        .expect("sink failure must not surface");

    assert_eq!(store.entry_count("journeys:out"), 0, "correlation completed");
    assert_eq!(store.entry_count("journeys:in"), 0);
}

/// No topic id, hashes diverged at the hop: only the stable payload
/// windows correlate the receipt back to its journey.
#[tokio::test(start_paused = true)]
async fn cross_revision_payloads_correlate_heuristically() {
    let mut t = tracker();

    // Older revision partial: version tag 0x0208, then the amount window
    // at bytes 10..28 and a 65-byte beneficiary tail.
    let mut partial = hex::decode("02080000000000000000").unwrap();
    partial.extend(hex::decode("0101010101010101010101010101010101").unwrap());
    partial.push(0x01);
    partial.extend(std::iter::repeat(0xee).take(65));

    // Newer revision re-encodes around the same fields.
    let mut observed = hex::decode("0310deadbeef").unwrap();
    observed.extend_from_slice(&partial[10..28]);
    observed.extend(hex::decode("cafe").unwrap());
    observed.extend(std::iter::repeat(0xee).take(65));

    let mut msg = journey(
        "A",
        "C",
        vec![leg("A", "B", LegKind::Hop), leg("B", "C", LegKind::Hrmp)],
        "0xAA",
        None,
    );
    msg.legs[0].partial_message = Some(HexPayload::new(partial));
    t.engine.on_outbound_message(msg, None).await.unwrap();
    t.drain();

    let mut rec = receipt("B", "0xf00d", None);
    rec.message_data = Some(HexPayload::new(observed));
    t.engine.on_inbound_message(rec).await.unwrap();

    let updates = t.drain();
    assert_eq!(kinds(&updates), vec!["hop"]);
}

/// The bus is observational: dropping every subscriber never disturbs
/// correlation.
#[tokio::test(start_paused = true)]
async fn bus_subscribers_are_optional() {
    let mut t = tracker();
    t.engine
        .on_outbound_message(
            journey("A", "B", vec![leg("A", "B", LegKind::Vmp)], "0xAA", None),
            None,
        )
        .await
        .unwrap();
    t.engine
        .on_inbound_message(receipt("B", "0xAA", None))
        .await
        .unwrap();
    assert_eq!(kinds(&t.drain()), vec!["sent", "received"]);
    assert!(t.bus.events_published() >= 2);
}
