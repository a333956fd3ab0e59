/**
 * Coordinator Events
 *
 * Everything that reaches the coordinator arrives as a `HubEvent` on its
 * inbox and is processed one at a time, in arrival order.
 */
use bytes::Bytes;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::oneshot;

use crate::backend::hub::connection::{Connection, ConnectionId};
use crate::shared::{GroupId, UserId};

/// A message submitted for persistence and fan-out
///
/// `sender_id` is the server-verified id of the author, never a value read
/// from the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastEvent {
    pub group_id: GroupId,
    pub payload: Bytes,
    pub sender_id: UserId,
}

impl BroadcastEvent {
    pub fn new(group_id: GroupId, payload: impl Into<Bytes>, sender_id: UserId) -> Self {
        Self {
            group_id,
            payload: payload.into(),
            sender_id,
        }
    }
}

/// Read-only copy of the registry membership
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HubSnapshot {
    pub groups: BTreeMap<GroupId, BTreeSet<ConnectionId>>,
}

impl HubSnapshot {
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn connection_count(&self) -> usize {
        self.groups.values().map(BTreeSet::len).sum()
    }

    pub fn has_group(&self, group_id: &GroupId) -> bool {
        self.groups.contains_key(group_id)
    }

    pub fn is_member(&self, group_id: &GroupId, id: ConnectionId) -> bool {
        self.groups
            .get(group_id)
            .is_some_and(|members| members.contains(&id))
    }
}

/// Inbound coordinator events
#[derive(Debug)]
pub enum HubEvent {
    Register(Connection),
    Unregister(ConnectionId),
    Broadcast(BroadcastEvent),
    /// Introspection only; never mutates the registry
    Snapshot(oneshot::Sender<HubSnapshot>),
}
