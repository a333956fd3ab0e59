/**
 * Chat Identifiers and Message Envelope
 *
 * This module defines the identifiers shared by every layer (`GroupId`,
 * `UserId`) and the single typed chat envelope that flows from the gateway
 * through the hub into persistence.
 *
 * A network client only ever sends a `ClientMessage` (just the content).
 * The gateway turns it into a `ChatMessage`, filling in everything the
 * client must not control: the group, the sender's display name and the
 * server timestamp. The sender id itself is stamped later by the hub.
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::shared::error::SharedError;

/// Conversation group identifier
///
/// Externally assigned and stable; it is the `{group_id}` path segment of
/// the websocket route. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    /// Create a group id, rejecting empty or whitespace-only values
    pub fn new(value: impl Into<String>) -> Result<Self, SharedError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(SharedError::validation("group_id", "group id must not be empty"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Authenticated user identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Frame shape accepted from a network client
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientMessage {
    /// The message text content
    pub content: String,
}

impl ClientMessage {
    /// Decode a raw inbound frame
    ///
    /// Unknown fields (including any client-supplied `sender_id`) are ignored.
    pub fn decode(payload: &[u8]) -> Result<Self, SharedError> {
        let message: ClientMessage = serde_json::from_slice(payload)?;
        if message.content.trim().is_empty() {
            return Err(SharedError::validation("content", "message content cannot be empty"));
        }
        Ok(message)
    }
}

/// The chat envelope published to a group and stored by persistence
///
/// # Fields
/// * `group_id` - Group the message was sent to
/// * `sender_name` - Display name of the verified sender
/// * `content` - The message text
/// * `created_at` - Server-side UTC timestamp
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub group_id: GroupId,
    pub sender_name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Create a message stamped with the current UTC time
    pub fn new(group_id: GroupId, sender_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            group_id,
            sender_name: sender_name.into(),
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, SharedError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode an envelope previously produced by [`ChatMessage::encode`]
    ///
    /// A stamped copy (with an extra `sender_id` key) decodes as well.
    pub fn decode(payload: &[u8]) -> Result<Self, SharedError> {
        serde_json::from_slice(payload)
            .map_err(|e| SharedError::envelope(format!("not a chat message: {}", e)))
    }
}
