/**
 * PostgreSQL Message Store
 *
 * Persists chat envelopes to the `messages` table (see `migrations/`).
 * The sender id always comes from the broadcast event, which carries the
 * server-verified identity; only name, content and timestamp are read from
 * the envelope the gateway produced.
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::backend::hub::BroadcastEvent;
use crate::backend::persistence::{MessageStore, PersistenceError, StoredMessage};
use crate::shared::{ChatMessage, GroupId, UserId};

#[derive(Debug, Clone)]
pub struct PgMessageStore {
    pool: PgPool,
}

impl PgMessageStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageStore for PgMessageStore {
    /// Insert one message
    ///
    /// # Errors
    /// `PersistenceError::Envelope` if the payload is not a chat envelope,
    /// `PersistenceError::Database` if the insert fails.
    async fn save(&self, event: &BroadcastEvent) -> Result<(), PersistenceError> {
        let message = ChatMessage::decode(&event.payload)?;

        sqlx::query(
            r#"
            INSERT INTO messages (group_id, sender_id, sender_name, content, created_at, message_type)
            VALUES ($1, $2, $3, $4, $5, 'text')
            "#,
        )
        .bind(event.group_id.as_str())
        .bind(event.sender_id.0)
        .bind(&message.sender_name)
        .bind(&message.content)
        .bind(message.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn history(&self, group_id: &GroupId, limit: i64) -> Result<Vec<StoredMessage>, PersistenceError> {
        #[derive(sqlx::FromRow)]
        struct MessageRow {
            id: i64,
            sender_id: i64,
            sender_name: String,
            content: String,
            created_at: DateTime<Utc>,
        }

        // Newest page first, flipped below so callers get chronological order.
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, sender_id, sender_name, content, created_at
            FROM messages
            WHERE group_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(group_id.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let messages = rows
            .into_iter()
            .rev()
            .map(|row| StoredMessage {
                id: row.id,
                group_id: group_id.clone(),
                sender_id: UserId(row.sender_id),
                sender_name: row.sender_name,
                content: row.content,
                created_at: row.created_at,
            })
            .collect();

        Ok(messages)
    }
}
