//! Read and write pump tests over in-memory transports

use async_trait::async_trait;
use bytes::Bytes;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use tokio::time::{timeout, Duration};

use studyhub::backend::hub::{
    read_pump, write_pump, Connection, ConnectionHandle, Frame, Hub, HubHandle, InboundHandler, OutboundQueue,
    PumpConfig, ReadExit, WriteExit,
};
use studyhub::shared::{GroupId, HubConfig, UserId};

use crate::common::{failing_sink, peer_stream, recording_sink, stalled_sink, RecordingStore};

#[derive(Default)]
struct CollectingHandler {
    received: Vec<Bytes>,
}

#[async_trait]
impl InboundHandler for CollectingHandler {
    async fn on_message(&mut self, payload: Bytes) {
        self.received.push(payload);
    }
}

fn text(payload: &'static str) -> Frame {
    Frame::Text(Bytes::from_static(payload.as_bytes()))
}

fn hub() -> HubHandle {
    Hub::spawn(Arc::new(RecordingStore::new()), &HubConfig::default())
}

async fn registered(hub: &HubHandle, capacity: usize) -> (ConnectionHandle, OutboundQueue) {
    let (connection, queue) = Connection::new(GroupId::new("7").unwrap(), UserId(1), capacity);
    let handle = connection.handle();
    hub.register(connection).await.unwrap();
    (handle, queue)
}

fn never() -> std::future::Pending<()> {
    std::future::pending()
}

#[tokio::test]
async fn test_read_pump_forwards_payloads_and_unregisters() {
    let hub = hub();
    let (handle, _queue) = registered(&hub, 8).await;

    let (peer, stream) = peer_stream();
    peer.send(Ok(text("first"))).await.unwrap();
    peer.send(Ok(Frame::Ping(Bytes::new()))).await.unwrap();
    peer.send(Ok(Frame::Binary(Bytes::from_static(b"second")))).await.unwrap();
    peer.send(Ok(Frame::Close)).await.unwrap();

    let mut handler = CollectingHandler::default();
    let exit = read_pump(stream, &handle, &hub, &PumpConfig::default(), &mut handler, never()).await;

    assert_eq!(exit, ReadExit::PeerClosed);
    assert_eq!(
        handler.received,
        vec![Bytes::from_static(b"first"), Bytes::from_static(b"second")]
    );

    let snapshot = hub.snapshot().await.unwrap();
    assert!(!snapshot.is_member(&handle.group_id, handle.id));
}

#[tokio::test]
async fn test_read_pump_times_out_silent_peer() {
    let hub = hub();
    let (handle, _queue) = registered(&hub, 8).await;
    let config = PumpConfig {
        pong_wait: Duration::from_millis(50),
        ..PumpConfig::default()
    };

    let (_peer, stream) = peer_stream();
    let mut handler = CollectingHandler::default();
    let exit = read_pump(stream, &handle, &hub, &config, &mut handler, never()).await;

    assert_eq!(exit, ReadExit::ReadTimeout);
    assert_eq!(hub.snapshot().await.unwrap().connection_count(), 0);
}

#[tokio::test]
async fn test_heartbeats_keep_connection_alive() {
    let hub = hub();
    let (handle, _queue) = registered(&hub, 8).await;
    let config = PumpConfig {
        pong_wait: Duration::from_millis(100),
        ..PumpConfig::default()
    };

    let (peer, stream) = peer_stream();
    tokio::spawn(async move {
        for _ in 0..5 {
            tokio::time::sleep(Duration::from_millis(40)).await;
            let _ = peer.send(Ok(Frame::Pong(Bytes::new()))).await;
        }
        let _ = peer.send(Ok(Frame::Close)).await;
    });

    let mut handler = CollectingHandler::default();
    let exit = read_pump(stream, &handle, &hub, &config, &mut handler, never()).await;
    assert_eq!(exit, ReadExit::PeerClosed);
}

#[tokio::test]
async fn test_oversized_frame_ends_connection() {
    let hub = hub();
    let (handle, _queue) = registered(&hub, 8).await;
    let config = PumpConfig {
        max_message_size: 8,
        ..PumpConfig::default()
    };

    let (peer, stream) = peer_stream();
    peer.send(Ok(text("12345678"))).await.unwrap();
    peer.send(Ok(text("123456789"))).await.unwrap();

    let mut handler = CollectingHandler::default();
    let exit = read_pump(stream, &handle, &hub, &config, &mut handler, never()).await;

    assert_eq!(exit, ReadExit::Oversized(9));
    assert_eq!(handler.received, vec![Bytes::from_static(b"12345678")]);
}

#[tokio::test]
async fn test_read_pump_stops_when_writer_stops() {
    let hub = hub();
    let (handle, _queue) = registered(&hub, 8).await;

    let (_peer, stream) = peer_stream();
    let mut handler = CollectingHandler::default();
    let exit = read_pump(
        stream,
        &handle,
        &hub,
        &PumpConfig::default(),
        &mut handler,
        std::future::ready(()),
    )
    .await;

    assert_eq!(exit, ReadExit::WriterStopped);
    assert_eq!(hub.snapshot().await.unwrap().connection_count(), 0);
}

#[tokio::test]
async fn test_read_pump_reports_transport_end_and_errors() {
    let hub = hub();

    let (handle, _queue) = registered(&hub, 8).await;
    let (peer, stream) = peer_stream();
    drop(peer);
    let mut handler = CollectingHandler::default();
    let exit = read_pump(stream, &handle, &hub, &PumpConfig::default(), &mut handler, never()).await;
    assert_eq!(exit, ReadExit::StreamEnded);

    let (handle, _queue) = registered(&hub, 8).await;
    let (peer, stream) = peer_stream();
    peer.send(Err("connection reset".to_string())).await.unwrap();
    let exit = read_pump(stream, &handle, &hub, &PumpConfig::default(), &mut handler, never()).await;
    assert_eq!(exit, ReadExit::TransportError("connection reset".to_string()));
}

#[tokio::test]
async fn test_write_pump_preserves_order_then_closes() {
    let (connection, queue) = Connection::new(GroupId::new("7").unwrap(), UserId(1), 8);
    let handle = connection.handle();
    for payload in ["a", "b", "c"] {
        connection.try_deliver(Bytes::from_static(payload.as_bytes())).unwrap();
    }
    drop(connection);

    let (sink, mut frames) = recording_sink();
    let exit = write_pump(sink, queue, &handle, &PumpConfig::default()).await;
    assert_eq!(exit, WriteExit::QueueClosed);

    let mut written = Vec::new();
    while let Ok(frame) = frames.try_recv() {
        written.push(frame);
    }
    assert_eq!(written, vec![text("a"), text("b"), text("c"), Frame::Close]);
}

#[tokio::test]
async fn test_write_pump_pings_when_idle() {
    let (connection, queue) = Connection::new(GroupId::new("7").unwrap(), UserId(1), 8);
    let handle = connection.handle();
    let config = PumpConfig {
        ping_period: Duration::from_millis(30),
        ..PumpConfig::default()
    };

    let (sink, mut frames) = recording_sink();
    let writer = tokio::spawn(async move { write_pump(sink, queue, &handle, &config).await });

    let first = timeout(Duration::from_secs(1), frames.recv()).await.unwrap().unwrap();
    assert_eq!(first, Frame::Ping(Bytes::new()));

    drop(connection);
    assert_eq!(writer.await.unwrap(), WriteExit::QueueClosed);
}

#[tokio::test]
async fn test_write_pump_stops_on_transport_error() {
    let (connection, queue) = Connection::new(GroupId::new("7").unwrap(), UserId(1), 8);
    connection.try_deliver(Bytes::from_static(b"hello")).unwrap();

    let exit = write_pump(failing_sink(), queue, &connection.handle(), &PumpConfig::default()).await;
    assert_eq!(exit, WriteExit::TransportError("connection reset".to_string()));
}

#[tokio::test]
async fn test_write_pump_stops_on_stalled_transport() {
    let (connection, queue) = Connection::new(GroupId::new("7").unwrap(), UserId(1), 8);
    connection.try_deliver(Bytes::from_static(b"hello")).unwrap();
    let config = PumpConfig {
        write_wait: Duration::from_millis(50),
        ..PumpConfig::default()
    };

    let exit = write_pump(stalled_sink(), queue, &connection.handle(), &config).await;
    assert_eq!(exit, WriteExit::WriteTimeout);
}
