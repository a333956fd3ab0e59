/**
 * In-Memory Message Store
 *
 * Keeps messages in process memory. The server falls back to this store
 * when `DATABASE_URL` is not set, so chat keeps working (without durability
 * across restarts) in local development.
 */
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::backend::hub::BroadcastEvent;
use crate::backend::persistence::{MessageStore, PersistenceError, StoredMessage};
use crate::shared::{ChatMessage, GroupId};

#[derive(Debug, Default)]
pub struct MemoryMessageStore {
    messages: RwLock<Vec<StoredMessage>>,
}

impl MemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn is_empty(&self) -> bool {
        self.messages.read().await.is_empty()
    }
}

#[async_trait]
impl MessageStore for MemoryMessageStore {
    async fn save(&self, event: &BroadcastEvent) -> Result<(), PersistenceError> {
        let message = ChatMessage::decode(&event.payload)?;
        let mut messages = self.messages.write().await;
        let id = messages.len() as i64 + 1;
        messages.push(StoredMessage {
            id,
            group_id: event.group_id.clone(),
            sender_id: event.sender_id,
            sender_name: message.sender_name,
            content: message.content,
            created_at: message.created_at,
        });
        Ok(())
    }

    async fn history(&self, group_id: &GroupId, limit: i64) -> Result<Vec<StoredMessage>, PersistenceError> {
        let messages = self.messages.read().await;
        let mut recent: Vec<StoredMessage> = messages
            .iter()
            .rev()
            .filter(|m| &m.group_id == group_id)
            .take(limit.max(0) as usize)
            .cloned()
            .collect();
        recent.reverse();
        Ok(recent)
    }
}
