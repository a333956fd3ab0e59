/**
 * Chat Relay
 *
 * The `InboundHandler` installed on every websocket connection. Turns a raw
 * client frame into a `ChatMessage` signed with the verified principal and
 * hands it to the hub.
 */
use async_trait::async_trait;
use bytes::Bytes;

use crate::backend::auth::Principal;
use crate::backend::hub::{HubHandle, InboundHandler};
use crate::shared::{ChatMessage, ClientMessage, GroupId};

pub struct ChatRelay {
    hub: HubHandle,
    group_id: GroupId,
    principal: Principal,
}

impl ChatRelay {
    pub fn new(hub: HubHandle, group_id: GroupId, principal: Principal) -> Self {
        Self { hub, group_id, principal }
    }
}

#[async_trait]
impl InboundHandler for ChatRelay {
    async fn on_message(&mut self, payload: Bytes) {
        // Malformed frames are dropped; the connection stays open.
        let incoming = match ClientMessage::decode(&payload) {
            Ok(message) => message,
            Err(e) => {
                tracing::debug!(group = %self.group_id, user = %self.principal.user_id, error = %e, "[Relay] Ignoring malformed frame");
                return;
            }
        };

        let message = ChatMessage::new(self.group_id.clone(), &self.principal.display_name, incoming.content);
        let encoded = match message.encode() {
            Ok(encoded) => encoded,
            Err(e) => {
                tracing::error!(group = %self.group_id, error = %e, "[Relay] Failed to encode chat message");
                return;
            }
        };

        if let Err(e) = self
            .hub
            .submit_inbound(self.group_id.clone(), encoded, self.principal.user_id)
            .await
        {
            tracing::warn!(group = %self.group_id, error = %e, "[Relay] Hub rejected message");
        }
    }
}
