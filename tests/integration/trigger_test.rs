//! Connectivity-driven draining

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use villagesync::offline::ActionStore;
use villagesync::sync::{NetworkStatus, SyncStatus, SyncTrigger};

use crate::common::*;
use crate::{assert_ok, assert_pending_keys};

#[tokio::test]
async fn test_drains_when_connectivity_returns() {
    let t = TestQueue::offline(ScriptedTransport::succeeding());
    assert_ok!(t.queue.enqueue(vote("P101", 1000)).await);
    let subscription = SyncTrigger::subscribe(t.queue.clone(), &t.monitor, false);

    t.go_online();
    t.wait_for_drains(1).await;

    assert_pending_keys!(t.queue, []);
    assert_eq!(t.transport.call_count(), 1);
    assert!(subscription.is_active());
}

#[tokio::test]
async fn test_drains_again_after_each_reconnect() {
    let t = TestQueue::offline(ScriptedTransport::succeeding());
    let _subscription = SyncTrigger::subscribe(t.queue.clone(), &t.monitor, false);

    assert_ok!(t.queue.enqueue(vote("P101", 1)).await);
    t.go_online();
    t.wait_for_drains(1).await;

    t.go_offline();
    assert_ok!(t.queue.enqueue(issue("leak")).await);
    t.go_online();
    t.wait_for_drains(2).await;

    assert_pending_keys!(t.queue, []);
    assert_eq!(t.transport.call_count(), 2);
}

#[tokio::test]
async fn test_reconnect_before_trigger_wakes_still_drains() {
    let t = TestQueue::online(ScriptedTransport::succeeding());
    let _subscription = SyncTrigger::subscribe(t.queue.clone(), &t.monitor, false);
    assert_ok!(t.queue.enqueue(vote("P101", 1000)).await);

    // both transitions land before the trigger task runs
    t.go_offline();
    t.go_online();
    t.wait_for_drains(1).await;

    assert_pending_keys!(t.queue, []);
    assert_eq!(t.transport.call_count(), 1);
}

#[tokio::test]
async fn test_reconnect_during_drain_drains_again() {
    let gate = Arc::new(ReplayGate::default());
    let t = TestQueue::offline(ScriptedTransport::failing_all().with_gate(gate.clone()));
    assert_ok!(t.queue.enqueue(vote("P101", 1000)).await);
    let _subscription = SyncTrigger::subscribe(t.queue.clone(), &t.monitor, false);

    t.go_online();
    gate.wait_started().await;
    t.go_offline();
    t.go_online();
    gate.release_one();

    gate.wait_started().await;
    gate.release_one();
    t.wait_for_drains(2).await;

    assert_eq!(t.transport.call_count(), 2);
    assert_pending_keys!(t.queue, ["vote"]);
}

#[tokio::test]
async fn test_repeated_online_signal_does_not_drain() {
    let t = TestQueue::online(ScriptedTransport::succeeding());
    let _subscription = SyncTrigger::subscribe(t.queue.clone(), &t.monitor, false);

    assert!(!t.monitor.set_status(NetworkStatus::Online));
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(t.queue.state().completed_drains, 0);
}

#[tokio::test]
async fn test_drain_on_start_when_already_online() {
    let t = TestQueue::online(ScriptedTransport::succeeding());
    assert_ok!(t.queue.enqueue(vote("P101", 1)).await);

    let _subscription = SyncTrigger::subscribe(t.queue.clone(), &t.monitor, true);
    t.wait_for_drains(1).await;

    assert!(assert_ok!(t.store.read_all().await).is_empty());
}

#[tokio::test]
async fn test_drain_on_start_skipped_while_offline() {
    let t = TestQueue::offline(ScriptedTransport::succeeding());
    assert_ok!(t.queue.enqueue(vote("P101", 1)).await);

    let _subscription = SyncTrigger::subscribe(t.queue.clone(), &t.monitor, true);
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(t.transport.call_count(), 0);
    assert_pending_keys!(t.queue, ["vote"]);
}

#[tokio::test]
async fn test_unsubscribe_stops_draining() {
    let t = TestQueue::offline(ScriptedTransport::succeeding());
    assert_ok!(t.queue.enqueue(vote("P101", 1)).await);

    let subscription = SyncTrigger::subscribe(t.queue.clone(), &t.monitor, false);
    subscription.unsubscribe();

    t.go_online();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(t.transport.call_count(), 0);
    assert_pending_keys!(t.queue, ["vote"]);
}

#[tokio::test]
async fn test_dropping_subscription_stops_draining() {
    let t = TestQueue::offline(ScriptedTransport::succeeding());
    assert_ok!(t.queue.enqueue(vote("P101", 1)).await);

    {
        let _subscription = SyncTrigger::subscribe(t.queue.clone(), &t.monitor, false);
    }

    t.go_online();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(t.transport.call_count(), 0);
}

#[tokio::test]
async fn test_sync_now_drains_without_transition() {
    let t = TestQueue::online(ScriptedTransport::failing_urls(&["/api/issue"]));
    assert_ok!(t.queue.enqueue(vote("P101", 1)).await);
    assert_ok!(t.queue.enqueue(issue("leak")).await);
    let subscription = SyncTrigger::subscribe(t.queue.clone(), &t.monitor, false);

    let report = assert_ok!(subscription.sync_now().await);

    assert_eq!(report.delivered(), 1);
    assert_eq!(report.retained(), 1);
    assert_eq!(t.queue.state().status, SyncStatus::Completed);
    assert_pending_keys!(t.queue, ["issue"]);
}

#[tokio::test]
async fn test_sync_now_offline_is_skipped() {
    let t = TestQueue::offline(ScriptedTransport::succeeding());
    assert_ok!(t.queue.enqueue(vote("P101", 1)).await);
    let subscription = SyncTrigger::subscribe(t.queue.clone(), &t.monitor, false);

    let report = assert_ok!(subscription.sync_now().await);

    assert!(report.skipped_offline);
    assert_pending_keys!(t.queue, ["vote"]);
}
