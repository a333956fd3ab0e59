/**
 * Connection Pumps
 *
 * Each live connection runs two tasks:
 *
 * - the **read pump** pulls frames from the transport and hands each
 *   payload to an `InboundHandler`, then unregisters the connection when it
 *   stops for any reason;
 * - the **write pump** drains the outbound queue into the transport,
 *   sends heartbeats while idle, and sends a close frame once the
 *   coordinator closes the queue.
 *
 * Both pumps are generic over a `Frame` stream/sink so they can be driven
 * by an axum websocket or by in-memory channels in tests. Every transport
 * operation carries a deadline; a failure ends only this connection.
 */
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::time::{timeout, Instant, MissedTickBehavior};

use crate::backend::hub::connection::{ConnectionHandle, OutboundQueue};
use crate::backend::hub::coordinator::HubHandle;
use crate::shared::HubConfig;

/// Transport-neutral websocket frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text(Bytes),
    Binary(Bytes),
    Ping(Bytes),
    Pong(Bytes),
    Close,
}

/// Timings and limits used by both pumps
#[derive(Debug, Clone, PartialEq)]
pub struct PumpConfig {
    pub pong_wait: Duration,
    pub ping_period: Duration,
    pub write_wait: Duration,
    pub max_message_size: usize,
    pub max_batch: usize,
}

impl From<&HubConfig> for PumpConfig {
    fn from(config: &HubConfig) -> Self {
        Self {
            pong_wait: config.pong_wait,
            ping_period: config.ping_period,
            write_wait: config.write_wait,
            max_message_size: config.max_message_size,
            max_batch: config.max_batch,
        }
    }
}

impl Default for PumpConfig {
    fn default() -> Self {
        Self::from(&HubConfig::default())
    }
}

/// Application callback for inbound payloads
///
/// Runs on the read pump's task. A slow handler delays further reads from
/// this connection only.
#[async_trait]
pub trait InboundHandler: Send {
    async fn on_message(&mut self, payload: Bytes);
}

/// Why the read pump stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadExit {
    /// The peer sent a close frame
    PeerClosed,
    /// The transport ended without a close frame
    StreamEnded,
    /// Nothing was heard within the read deadline
    ReadTimeout,
    /// A frame exceeded the maximum message size
    Oversized(usize),
    TransportError(String),
    /// The write pump for this connection exited first
    WriterStopped,
}

/// Why the write pump stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteExit {
    /// The coordinator closed the outbound queue
    QueueClosed,
    WriteTimeout,
    TransportError(String),
}

/// Read frames until the connection ends, then unregister it
///
/// `writer_done` resolves when the paired write pump has exited; the read
/// pump then stops too, so a dead writer never leaves a half-open session.
/// Unregister is sent on every exit path before the transport is released.
pub async fn read_pump<S, E, H, W>(
    mut transport: S,
    connection: &ConnectionHandle,
    hub: &HubHandle,
    config: &PumpConfig,
    handler: &mut H,
    writer_done: W,
) -> ReadExit
where
    S: Stream<Item = Result<Frame, E>> + Unpin,
    E: fmt::Display,
    H: InboundHandler,
    W: Future<Output = ()>,
{
    tokio::pin!(writer_done);

    let exit = loop {
        let next = tokio::select! {
            biased;
            _ = &mut writer_done => break ReadExit::WriterStopped,
            next = timeout(config.pong_wait, transport.next()) => next,
        };

        let frame = match next {
            Err(_) => break ReadExit::ReadTimeout,
            Ok(None) => break ReadExit::StreamEnded,
            Ok(Some(Err(e))) => break ReadExit::TransportError(e.to_string()),
            Ok(Some(Ok(frame))) => frame,
        };

        match frame {
            Frame::Text(payload) | Frame::Binary(payload) => {
                if payload.len() > config.max_message_size {
                    break ReadExit::Oversized(payload.len());
                }
                handler.on_message(payload).await;
            }
            // Any frame re-arms the deadline; heartbeats need nothing else.
            Frame::Ping(_) | Frame::Pong(_) => {}
            Frame::Close => break ReadExit::PeerClosed,
        }
    };

    match &exit {
        ReadExit::PeerClosed | ReadExit::StreamEnded | ReadExit::WriterStopped => {
            tracing::debug!(id = %connection.id, group = %connection.group_id, reason = ?exit, "[Pump] Read pump finished");
        }
        _ => {
            tracing::info!(id = %connection.id, group = %connection.group_id, reason = ?exit, "[Pump] Read pump dropped connection");
        }
    }

    if let Err(e) = hub.unregister(connection.id).await {
        tracing::debug!(id = %connection.id, error = %e, "[Pump] Could not unregister connection");
    }
    drop(transport);

    exit
}

/// Drain the outbound queue into the transport
///
/// Payloads already waiting in the queue are fed together and flushed once,
/// each as its own frame. A ping goes out whenever `ping_period` passes
/// without a write.
pub async fn write_pump<K>(
    mut transport: K,
    mut queue: OutboundQueue,
    connection: &ConnectionHandle,
    config: &PumpConfig,
) -> WriteExit
where
    K: Sink<Frame> + Unpin,
    K::Error: fmt::Display,
{
    let mut heartbeat = tokio::time::interval_at(Instant::now() + config.ping_period, config.ping_period);
    heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let exit = loop {
        tokio::select! {
            next = queue.recv() => match next {
                Some(payload) => {
                    let mut batch = vec![payload];
                    while batch.len() < config.max_batch {
                        match queue.try_recv() {
                            Ok(payload) => batch.push(payload),
                            Err(_) => break,
                        }
                    }
                    if let Err(exit) = write_batch(&mut transport, batch, config.write_wait).await {
                        break exit;
                    }
                    heartbeat.reset();
                }
                None => {
                    let _ = timeout(config.write_wait, transport.send(Frame::Close)).await;
                    break WriteExit::QueueClosed;
                }
            },
            _ = heartbeat.tick() => {
                match timeout(config.write_wait, transport.send(Frame::Ping(Bytes::new()))).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => break WriteExit::TransportError(e.to_string()),
                    Err(_) => break WriteExit::WriteTimeout,
                }
            }
        }
    };

    let _ = timeout(config.write_wait, transport.close()).await;

    match &exit {
        WriteExit::QueueClosed => {
            tracing::debug!(id = %connection.id, group = %connection.group_id, "[Pump] Write pump finished");
        }
        _ => {
            tracing::info!(id = %connection.id, group = %connection.group_id, reason = ?exit, "[Pump] Write pump dropped connection");
        }
    }

    exit
}

async fn write_batch<K>(transport: &mut K, batch: Vec<Bytes>, write_wait: Duration) -> Result<(), WriteExit>
where
    K: Sink<Frame> + Unpin,
    K::Error: fmt::Display,
{
    let write = async {
        for payload in batch {
            transport.feed(Frame::Text(payload)).await?;
        }
        transport.flush().await
    };

    match timeout(write_wait, write).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(WriteExit::TransportError(e.to_string())),
        Err(_) => Err(WriteExit::WriteTimeout),
    }
}
