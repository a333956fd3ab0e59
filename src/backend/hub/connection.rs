/**
 * Connection and Outbound Queue
 *
 * A live client session is represented by two halves:
 *
 * - `Connection` is handed to the coordinator at registration and lives in
 *   the registry. It owns the only sender of the outbound queue, so removing
 *   it from the registry (and dropping it) is what closes the queue.
 * - `ConnectionHandle` is a cheap copy of the identity (id, group, user) that
 *   the pumps keep so they can ask the coordinator to unregister them.
 *
 * The write pump owns the receiving end (`OutboundQueue`).
 */
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::shared::{GroupId, UserId};

/// Unique identity of one live connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a connection as seen by its pumps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionHandle {
    pub id: ConnectionId,
    pub group_id: GroupId,
    pub user_id: UserId,
}

/// Why a payload could not be queued for a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryFailure {
    /// The queue is at capacity; the consumer is too slow
    Full,
    /// The write pump is gone
    Closed,
}

/// Registry-owned side of a connection
#[derive(Debug)]
pub struct Connection {
    handle: ConnectionHandle,
    outbound: mpsc::Sender<Bytes>,
}

/// Receiving end of a connection's outbound queue
pub type OutboundQueue = mpsc::Receiver<Bytes>;

impl Connection {
    /// Create a connection with a bounded outbound queue
    ///
    /// # Returns
    /// The registry half and the queue receiver for the write pump.
    pub fn new(group_id: GroupId, user_id: UserId, capacity: usize) -> (Self, OutboundQueue) {
        Self::with_id(ConnectionId::new(), group_id, user_id, capacity)
    }

    /// Create a connection that reuses a known id
    pub fn with_id(
        id: ConnectionId,
        group_id: GroupId,
        user_id: UserId,
        capacity: usize,
    ) -> (Self, OutboundQueue) {
        let (outbound, queue) = mpsc::channel(capacity);
        let handle = ConnectionHandle { id, group_id, user_id };
        (Self { handle, outbound }, queue)
    }

    pub fn id(&self) -> ConnectionId {
        self.handle.id
    }

    pub fn group_id(&self) -> &GroupId {
        &self.handle.group_id
    }

    pub fn user_id(&self) -> UserId {
        self.handle.user_id
    }

    pub fn handle(&self) -> ConnectionHandle {
        self.handle.clone()
    }

    /// Queue a payload without waiting
    pub fn try_deliver(&self, payload: Bytes) -> Result<(), DeliveryFailure> {
        self.outbound.try_send(payload).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => DeliveryFailure::Full,
            mpsc::error::TrySendError::Closed(_) => DeliveryFailure::Closed,
        })
    }
}
