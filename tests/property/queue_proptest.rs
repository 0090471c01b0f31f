//! Ordering and retention properties of the offline queue

use proptest::prelude::*;
use serde_json::json;
use villagesync::offline::{ActionStore, MemoryStore};
use villagesync::shared::ActionRecord;

use crate::common::*;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn arb_record() -> impl Strategy<Value = ActionRecord> {
    (
        prop_oneof![Just("vote"), Just("issue"), Just("comment")],
        "[a-z]{1,8}",
        any::<i64>(),
        proptest::option::of(prop_oneof![Just("POST"), Just("put"), Just("PATCH")]),
    )
        .prop_map(|(key, segment, n, method)| {
            let record = ActionRecord::new(key, json!({ "n": n }), format!("/api/{}", segment));
            match method {
                Some(method) => record.with_method(method),
                None => record,
            }
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_enqueue_preserves_order(records in prop::collection::vec(arb_record(), 0..20)) {
        let stored = runtime().block_on(async {
            let t = TestQueue::offline(ScriptedTransport::succeeding());
            for record in &records {
                t.queue.enqueue(record.clone()).await.unwrap();
            }
            t.store.read_all().await.unwrap()
        });
        prop_assert_eq!(stored, records);
    }

    #[test]
    fn prop_rewrite_leaves_slot_unchanged(records in prop::collection::vec(arb_record(), 0..20)) {
        let (before, after) = runtime().block_on(async {
            let store = MemoryStore::new();
            store.write_all(&records).await.unwrap();
            let before = store.raw().await;
            let read = store.read_all().await.unwrap();
            store.write_all(&read).await.unwrap();
            (before, store.raw().await)
        });
        prop_assert_eq!(before, after);
    }

    #[test]
    fn prop_drain_retains_exactly_the_failures(
        entries in prop::collection::vec((arb_record(), any::<bool>()), 0..20)
    ) {
        let failing: Vec<String> = entries
            .iter()
            .enumerate()
            .filter(|(_, (_, fails))| *fails)
            .map(|(i, _)| format!("/fail/{}", i))
            .collect();
        let records: Vec<ActionRecord> = entries
            .iter()
            .enumerate()
            .map(|(i, (record, fails))| {
                let mut record = record.clone();
                if *fails {
                    record.url = format!("/fail/{}", i);
                }
                record
            })
            .collect();
        let expected: Vec<ActionRecord> = records
            .iter()
            .filter(|r| failing.contains(&r.url))
            .cloned()
            .collect();

        let urls: Vec<&str> = failing.iter().map(String::as_str).collect();
        let (report, retained) = runtime().block_on(async {
            let t = TestQueue::online(ScriptedTransport::failing_urls(&urls));
            for record in &records {
                t.queue.enqueue(record.clone()).await.unwrap();
            }
            let report = t.queue.drain().await.unwrap();
            (report, t.store.read_all().await.unwrap())
        });

        prop_assert_eq!(report.attempted(), records.len());
        prop_assert_eq!(report.retained(), expected.len());
        prop_assert_eq!(retained, expected);
    }
}
