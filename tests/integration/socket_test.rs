//! Real-socket tests: the router served on a loopback port, driven by
//! websocket clients

use futures_util::{SinkExt, StreamExt};
use pretty_assertions::assert_eq;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

use studyhub::backend::auth::JwtIdentity;
use studyhub::backend::persistence::{MemoryMessageStore, MessageStore};
use studyhub::backend::routes::create_router;
use studyhub::backend::server::{build_state, AppState};
use studyhub::shared::{GroupId, HubConfig, UserId};

use crate::common::{generate_test_token, TEST_SECRET};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const MAX_MESSAGE_SIZE: usize = 512;

async fn serve(store: Arc<MemoryMessageStore>) -> (SocketAddr, AppState) {
    let config = HubConfig::builder().max_message_size(MAX_MESSAGE_SIZE).build().unwrap();
    let state = build_state(store, Arc::new(JwtIdentity::new(TEST_SECRET)), config);
    let router = create_router(state.clone(), Duration::from_secs(5));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (addr, state)
}

async fn connect(addr: SocketAddr, group: &str, user_id: i64, name: &str) -> Client {
    let token = generate_test_token(user_id, name);
    let url = format!("ws://{}/ws/{}?token={}", addr, group, token);
    let (client, _) = connect_async(url).await.expect("websocket handshake");
    client
}

/// `GET /health` over a plain connection, returning (groups, connections)
async fn health(addr: SocketAddr) -> (u64, u64) {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut raw = String::new();
    stream.read_to_string(&mut raw).await.unwrap();

    let (head, body) = raw.split_once("\r\n\r\n").unwrap();
    assert!(head.starts_with("HTTP/1.1 200"), "unexpected response: {}", head);
    let body: Value = serde_json::from_str(body).unwrap();
    (body["groups"].as_u64().unwrap(), body["connections"].as_u64().unwrap())
}

/// Poll `/health` until it reports `connections`
async fn wait_for_connections(addr: SocketAddr, connections: u64) -> (u64, u64) {
    let mut counts = health(addr).await;
    for _ in 0..200 {
        if counts.1 == connections {
            return counts;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
        counts = health(addr).await;
    }
    panic!("expected {} connections, health reports {:?}", connections, counts);
}

async fn next_text(client: &mut Client) -> Value {
    let frame = tokio::time::timeout(Duration::from_secs(2), client.next())
        .await
        .expect("no frame within 2s")
        .expect("stream ended")
        .expect("socket error");
    match frame {
        Message::Text(text) => serde_json::from_str(text.as_str()).unwrap(),
        other => panic!("expected a text frame, got {:?}", other),
    }
}

#[tokio::test]
async fn test_group_fanout_over_real_sockets() {
    let store = Arc::new(MemoryMessageStore::new());
    let (addr, _state) = serve(store.clone()).await;

    let mut alice = connect(addr, "7", 42, "alice").await;
    let mut bob = connect(addr, "7", 43, "bob").await;
    let mut carol = connect(addr, "8", 44, "carol").await;
    assert_eq!(wait_for_connections(addr, 3).await, (2, 3));

    alice
        .send(Message::text(r#"{"content":"hi","sender_id":1}"#))
        .await
        .unwrap();

    for client in [&mut alice, &mut bob] {
        let received = next_text(client).await;
        assert_eq!(received["sender_id"], 42);
        assert_eq!(received["sender_name"], "alice");
        assert_eq!(received["content"], "hi");
    }

    let other_group = tokio::time::timeout(Duration::from_millis(200), carol.next()).await;
    assert!(other_group.is_err(), "group 8 received {:?}", other_group);

    let history = store.history(&GroupId::new("7").unwrap(), 10).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].sender_id, UserId(42));
}

#[tokio::test]
async fn test_disconnects_leave_the_hub() {
    let (addr, _state) = serve(Arc::new(MemoryMessageStore::new())).await;

    let mut alice = connect(addr, "7", 42, "alice").await;
    let mut bob = connect(addr, "7", 43, "bob").await;
    let carol = connect(addr, "8", 44, "carol").await;
    assert_eq!(wait_for_connections(addr, 3).await, (2, 3));

    bob.close(None).await.unwrap();
    assert_eq!(wait_for_connections(addr, 2).await, (2, 2));

    // Larger than the configured limit: the server drops the socket.
    let oversized = "x".repeat(MAX_MESSAGE_SIZE * 4);
    let _ = alice.send(Message::text(oversized)).await;
    assert_eq!(wait_for_connections(addr, 1).await, (1, 1));

    drop(carol);
    assert_eq!(wait_for_connections(addr, 0).await, (0, 0));
}

#[tokio::test]
async fn test_handshake_without_token_is_refused() {
    let (addr, state) = serve(Arc::new(MemoryMessageStore::new())).await;

    let result = connect_async(format!("ws://{}/ws/7", addr)).await;
    match result {
        Err(tokio_tungstenite::tungstenite::Error::Http(response)) => {
            assert_eq!(response.status(), 401);
        }
        other => panic!("expected an HTTP 401 rejection, got {:?}", other.map(|_| ())),
    }
    assert_eq!(state.hub.snapshot().await.unwrap().connection_count(), 0);
}
