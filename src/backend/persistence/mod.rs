//! Persistence Module
//!
//! The hub stores every accepted broadcast through the `MessageStore` trait
//! and never looks inside the store. Two implementations ship with the
//! server:
//!
//! - **`postgres`** - `PgMessageStore`, the production store (sqlx)
//! - **`memory`** - `MemoryMessageStore`, used when no database is configured
//!
//! # Module Structure
//!
//! ```text
//! persistence/
//! ├── mod.rs       - MessageStore trait, StoredMessage, PersistenceError
//! ├── memory.rs    - In-process store
//! └── postgres.rs  - PostgreSQL store
//! ```
//!
//! # Failure Policy
//!
//! A failed `save` is logged by the hub and never stops delivery. Callers
//! that need guaranteed durability must persist before submitting.

/// In-process message store
pub mod memory;

/// PostgreSQL message store
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

use crate::backend::hub::BroadcastEvent;
use crate::shared::{GroupId, SharedError, UserId};

pub use memory::MemoryMessageStore;
pub use postgres::PgMessageStore;

/// Largest history page a caller can request
pub const MAX_HISTORY_LIMIT: i64 = 200;

/// A message as read back from the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredMessage {
    pub id: i64,
    pub group_id: GroupId,
    pub sender_id: UserId,
    pub sender_name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Persistence errors
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("payload rejected: {0}")]
    Envelope(#[from] SharedError),

    #[error("save did not finish within {0:?}")]
    Timeout(Duration),
}

/// Durable storage for chat messages
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Store one broadcast
    async fn save(&self, event: &BroadcastEvent) -> Result<(), PersistenceError>;

    /// Most recent messages of a group, oldest first
    async fn history(&self, group_id: &GroupId, limit: i64) -> Result<Vec<StoredMessage>, PersistenceError>;
}

/// Clamp a requested history size to `1..=MAX_HISTORY_LIMIT`
pub fn clamp_history_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(50).clamp(1, MAX_HISTORY_LIMIT)
}
