//! Hub coordinator integration tests

use assert_matches::assert_matches;
use bytes::Bytes;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use tokio::time::{timeout, Duration};

use studyhub::backend::hub::{Connection, ConnectionId, Hub, HubError, HubHandle, OutboundQueue};
use studyhub::shared::{GroupId, HubConfig, UserId};

use crate::common::{FailingStore, RecordingStore, SlowStore};

fn group(id: &str) -> GroupId {
    GroupId::new(id).unwrap()
}

async fn join(hub: &HubHandle, group_id: &str, user: i64, capacity: usize) -> (ConnectionId, OutboundQueue) {
    let (connection, queue) = Connection::new(group(group_id), UserId(user), capacity);
    let id = connection.id();
    hub.register(connection).await.unwrap();
    (id, queue)
}

async fn next_json(queue: &mut OutboundQueue) -> serde_json::Value {
    let payload = timeout(Duration::from_secs(1), queue.recv())
        .await
        .expect("timed out waiting for delivery")
        .expect("queue closed");
    serde_json::from_slice(&payload).unwrap()
}

#[tokio::test]
async fn test_fan_out_reaches_only_the_group() {
    let hub = Hub::spawn(Arc::new(RecordingStore::new()), &HubConfig::default());

    let (_a, mut queue_a) = join(&hub, "7", 1, 8).await;
    let (_b, mut queue_b) = join(&hub, "7", 2, 8).await;
    let (_c, mut queue_c) = join(&hub, "8", 3, 8).await;

    hub.submit_inbound(group("7"), Bytes::from_static(br#"{"text":"hi"}"#), UserId(42))
        .await
        .unwrap();

    let expected = json!({"text": "hi", "sender_id": 42});
    assert_eq!(next_json(&mut queue_a).await, expected);
    assert_eq!(next_json(&mut queue_b).await, expected);

    hub.snapshot().await.unwrap();
    assert!(queue_c.try_recv().is_err());
}

#[tokio::test]
async fn test_broadcast_without_subscribers_is_dropped() {
    let store = RecordingStore::new();
    let hub = Hub::spawn(Arc::new(store.clone()), &HubConfig::default());

    hub.submit_inbound(group("9"), Bytes::from_static(br#"{"text":"anyone?"}"#), UserId(1))
        .await
        .unwrap();

    let snapshot = hub.snapshot().await.unwrap();
    assert!(!snapshot.has_group(&group("9")));
    assert!(store.saved().await.is_empty());
}

#[tokio::test]
async fn test_persistence_receives_verified_sender() {
    let store = RecordingStore::new();
    let hub = Hub::spawn(Arc::new(store.clone()), &HubConfig::default());
    let (_a, mut queue) = join(&hub, "7", 1, 8).await;

    hub.submit_inbound(
        group("7"),
        Bytes::from_static(br#"{"text":"spoofed","sender_id":999}"#),
        UserId(42),
    )
    .await
    .unwrap();

    assert_eq!(next_json(&mut queue).await["sender_id"], 42);

    let saved = store.saved().await;
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].sender_id, UserId(42));
    assert_eq!(saved[0].group_id, group("7"));
}

#[tokio::test]
async fn test_failing_store_still_delivers() {
    let hub = Hub::spawn(Arc::new(FailingStore), &HubConfig::default());
    let (_a, mut queue) = join(&hub, "7", 1, 8).await;

    hub.submit_inbound(group("7"), Bytes::from_static(br#"{"text":"still here"}"#), UserId(5))
        .await
        .unwrap();

    assert_eq!(next_json(&mut queue).await, json!({"text": "still here", "sender_id": 5}));
}

#[tokio::test]
async fn test_slow_store_is_bounded_by_persist_timeout() {
    let config = HubConfig::builder()
        .persist_timeout(Duration::from_millis(50))
        .build()
        .unwrap();
    let store = SlowStore {
        delay: Duration::from_secs(30),
    };
    let hub = Hub::spawn(Arc::new(store), &config);
    let (_a, mut queue) = join(&hub, "7", 1, 8).await;

    hub.submit_inbound(group("7"), Bytes::from_static(br#"{"text":"late"}"#), UserId(5))
        .await
        .unwrap();

    assert_eq!(next_json(&mut queue).await["text"], "late");
}

#[tokio::test]
async fn test_slow_consumer_is_evicted() {
    let hub = Hub::spawn(Arc::new(RecordingStore::new()), &HubConfig::default());
    let (slow, mut slow_queue) = join(&hub, "7", 1, 1).await;
    let (fast, mut fast_queue) = join(&hub, "7", 2, 8).await;

    for text in ["one", "two"] {
        let payload = serde_json::to_vec(&json!({ "text": text })).unwrap();
        hub.submit_inbound(group("7"), payload, UserId(3)).await.unwrap();
    }

    assert_eq!(next_json(&mut fast_queue).await["text"], "one");
    assert_eq!(next_json(&mut fast_queue).await["text"], "two");

    let snapshot = hub.snapshot().await.unwrap();
    assert!(!snapshot.is_member(&group("7"), slow));
    assert!(snapshot.is_member(&group("7"), fast));

    // The first message was queued before the eviction; then the queue closes.
    assert_eq!(next_json(&mut slow_queue).await["text"], "one");
    assert_eq!(slow_queue.recv().await, None);
}

#[tokio::test]
async fn test_unregister_closes_queue_and_removes_empty_group() {
    let hub = Hub::spawn(Arc::new(RecordingStore::new()), &HubConfig::default());
    let (a, mut queue) = join(&hub, "7", 1, 8).await;

    assert!(hub.snapshot().await.unwrap().is_member(&group("7"), a));

    hub.unregister(a).await.unwrap();
    assert_eq!(queue.recv().await, None);

    let snapshot = hub.snapshot().await.unwrap();
    assert!(!snapshot.has_group(&group("7")));
    assert_eq!(snapshot.connection_count(), 0);
}

#[tokio::test]
async fn test_double_and_unknown_unregister_are_ignored() {
    let hub = Hub::spawn(Arc::new(RecordingStore::new()), &HubConfig::default());
    let (a, _queue_a) = join(&hub, "7", 1, 8).await;
    let (b, _queue_b) = join(&hub, "7", 2, 8).await;

    hub.unregister(a).await.unwrap();
    hub.unregister(a).await.unwrap();
    hub.unregister(ConnectionId::new()).await.unwrap();

    let snapshot = hub.snapshot().await.unwrap();
    assert_eq!(snapshot.connection_count(), 1);
    assert!(snapshot.is_member(&group("7"), b));
}

#[tokio::test]
async fn test_messages_from_one_sender_keep_their_order() {
    let hub = Hub::spawn(Arc::new(RecordingStore::new()), &HubConfig::default());
    let (_a, mut queue) = join(&hub, "7", 1, 64).await;

    for n in 0..20 {
        let payload = serde_json::to_vec(&json!({ "n": n })).unwrap();
        hub.submit_inbound(group("7"), payload, UserId(2)).await.unwrap();
    }

    for n in 0..20 {
        assert_eq!(next_json(&mut queue).await["n"], n);
    }
}

#[tokio::test]
async fn test_handle_reports_stopped_hub() {
    let (handle, hub) = Hub::new(Arc::new(RecordingStore::new()), &HubConfig::default());
    drop(hub);

    let (connection, _queue) = Connection::new(group("7"), UserId(1), 8);
    assert_matches!(handle.register(connection).await, Err(HubError::Stopped));
    assert_matches!(handle.snapshot().await, Err(HubError::Stopped));
}
