//! StudyHub - Group Chat Server
//!
//! StudyHub relays chat messages between members of study groups over
//! websockets. Every message sent to a group is persisted and fanned out
//! to all connections currently subscribed to that group, stamped with the
//! verified id of its sender.
//!
//! # Module Structure
//!
//! - **`shared`** - Wire types, identifiers, hub configuration, errors
//!   - `ChatMessage` / `ClientMessage` envelopes
//!   - Sender stamping of outbound payloads
//!
//! - **`backend`** - The server
//!   - Hub coordinator, connection registry and socket pumps
//!   - JWT identity, PostgreSQL persistence
//!   - Axum routes and websocket gateway
//!
//! # Usage
//!
//! ```rust,no_run
//! use studyhub::backend::server::{create_app, ServerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::from_env()?;
//! let app = create_app(&config).await;
//! let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! Group membership lives in a single coordinator task and is only changed
//! through `HubHandle` events, so no lock guards it. Each connection owns a
//! bounded outbound queue; a connection that cannot keep up is evicted
//! rather than slowing its group down.

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
pub mod backend;
