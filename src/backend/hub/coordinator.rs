/**
 * Hub Coordinator
 *
 * The single task that owns the `GroupRegistry`. Registration,
 * unregistration and broadcast all arrive as events on one inbox and are
 * applied one at a time, so no lock is ever taken on the registry.
 *
 * # Broadcast Pipeline
 *
 * 1. Look up the group; no subscribers means the event is dropped.
 * 2. Persist the event (bounded by `persist_timeout`). Failure is logged and
 *    delivery continues.
 * 3. Stamp the verified sender id onto the payload, once.
 * 4. Queue the stamped payload on every member without waiting. A member
 *    whose queue is full (or already closed) is evicted on the spot.
 *
 * Nothing in the loop can fail, so the coordinator runs until every
 * `HubHandle` has been dropped.
 */
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use crate::backend::hub::connection::{Connection, ConnectionId, DeliveryFailure};
use crate::backend::hub::event::{BroadcastEvent, HubEvent, HubSnapshot};
use crate::backend::hub::registry::GroupRegistry;
use crate::backend::persistence::{MessageStore, PersistenceError};
use crate::shared::{stamp_sender, GroupId, HubConfig, UserId};

/// Errors returned to callers of `HubHandle`
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum HubError {
    #[error("hub coordinator has stopped")]
    Stopped,
}

/// Gateway-facing handle to the coordinator
///
/// Cheap to clone. Every method only enqueues an event; the coordinator
/// applies it later, in submission order.
#[derive(Debug, Clone)]
pub struct HubHandle {
    events: mpsc::Sender<HubEvent>,
}

impl HubHandle {
    /// Add a connection to its group
    pub async fn register(&self, connection: Connection) -> Result<(), HubError> {
        self.send(HubEvent::Register(connection)).await
    }

    /// Remove a connection and close its outbound queue
    ///
    /// Unknown or already removed ids are ignored.
    pub async fn unregister(&self, id: ConnectionId) -> Result<(), HubError> {
        self.send(HubEvent::Unregister(id)).await
    }

    /// Submit a message for persistence and fan-out to `group_id`
    pub async fn submit_inbound(
        &self,
        group_id: GroupId,
        payload: impl Into<Bytes>,
        sender_id: UserId,
    ) -> Result<(), HubError> {
        self.broadcast(BroadcastEvent::new(group_id, payload, sender_id)).await
    }

    pub async fn broadcast(&self, event: BroadcastEvent) -> Result<(), HubError> {
        self.send(HubEvent::Broadcast(event)).await
    }

    /// Copy of the current membership
    ///
    /// The snapshot reflects every event submitted before this call.
    pub async fn snapshot(&self) -> Result<HubSnapshot, HubError> {
        let (tx, rx) = oneshot::channel();
        self.send(HubEvent::Snapshot(tx)).await?;
        rx.await.map_err(|_| HubError::Stopped)
    }

    async fn send(&self, event: HubEvent) -> Result<(), HubError> {
        self.events.send(event).await.map_err(|_| HubError::Stopped)
    }
}

/// The coordinator itself
pub struct Hub {
    registry: GroupRegistry,
    inbox: mpsc::Receiver<HubEvent>,
    store: Arc<dyn MessageStore>,
    persist_timeout: Duration,
}

impl Hub {
    /// Create a coordinator and its handle without starting it
    pub fn new(store: Arc<dyn MessageStore>, config: &HubConfig) -> (HubHandle, Hub) {
        let (events, inbox) = mpsc::channel(config.inbox_capacity);
        let hub = Hub {
            registry: GroupRegistry::new(),
            inbox,
            store,
            persist_timeout: config.persist_timeout,
        };
        (HubHandle { events }, hub)
    }

    /// Create a coordinator and run it on its own task
    pub fn spawn(store: Arc<dyn MessageStore>, config: &HubConfig) -> HubHandle {
        let (handle, hub) = Self::new(store, config);
        tokio::spawn(hub.run());
        handle
    }

    /// Process events until every handle is dropped
    pub async fn run(mut self) {
        tracing::info!("[Hub] Coordinator started");
        while let Some(event) = self.inbox.recv().await {
            self.handle_event(event).await;
        }
        tracing::info!(
            connections = self.registry.connection_count(),
            "[Hub] All handles dropped, coordinator stopping"
        );
    }

    async fn handle_event(&mut self, event: HubEvent) {
        match event {
            HubEvent::Register(connection) => self.register(connection),
            HubEvent::Unregister(id) => self.unregister(id),
            HubEvent::Broadcast(event) => self.broadcast(event).await,
            HubEvent::Snapshot(reply) => {
                let _ = reply.send(HubSnapshot {
                    groups: self.registry.snapshot(),
                });
            }
        }
    }

    fn register(&mut self, connection: Connection) {
        let id = connection.id();
        let group_id = connection.group_id().clone();
        let user_id = connection.user_id();
        if self.registry.insert(connection) {
            tracing::info!(%id, group = %group_id, user = %user_id, "[Hub] Connection registered");
        } else {
            tracing::debug!(%id, group = %group_id, "[Hub] Connection already registered");
        }
    }

    fn unregister(&mut self, id: ConnectionId) {
        // Dropping the removed Connection closes its outbound queue.
        match self.registry.remove(id) {
            Some(connection) => {
                tracing::info!(%id, group = %connection.group_id(), "[Hub] Connection unregistered");
            }
            None => tracing::debug!(%id, "[Hub] Unregister for unknown connection ignored"),
        }
    }

    async fn broadcast(&mut self, event: BroadcastEvent) {
        if !self.registry.has_group(&event.group_id) {
            tracing::debug!(group = %event.group_id, "[Hub] No subscribers, broadcast dropped");
            return;
        }

        self.persist(&event).await;

        let payload = stamp_sender(&event.payload, event.sender_id);

        let mut delivered = 0usize;
        let mut evicted = Vec::new();
        if let Some(members) = self.registry.members(&event.group_id) {
            for connection in members {
                match connection.try_deliver(payload.clone()) {
                    Ok(()) => delivered += 1,
                    Err(reason) => evicted.push((connection.id(), reason)),
                }
            }
        }

        for (id, reason) in evicted {
            self.registry.remove(id);
            match reason {
                DeliveryFailure::Full => {
                    tracing::warn!(%id, group = %event.group_id, "[Hub] Outbound queue full, evicting slow consumer")
                }
                DeliveryFailure::Closed => {
                    tracing::debug!(%id, group = %event.group_id, "[Hub] Outbound queue closed, removing connection")
                }
            }
        }

        tracing::debug!(
            group = %event.group_id,
            sender = %event.sender_id,
            delivered,
            "[Hub] Broadcast delivered"
        );
    }

    async fn persist(&self, event: &BroadcastEvent) {
        let result = match tokio::time::timeout(self.persist_timeout, self.store.save(event)).await {
            Ok(result) => result,
            Err(_) => Err(PersistenceError::Timeout(self.persist_timeout)),
        };
        if let Err(e) = result {
            tracing::warn!(
                group = %event.group_id,
                sender = %event.sender_id,
                error = %e,
                "[Hub] Failed to persist message, delivering anyway"
            );
        }
    }
}
