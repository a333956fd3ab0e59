//! Backend Module
//!
//! This module contains all server-side code for StudyHub.
//!
//! # Architecture
//!
//! - **`hub`** - Coordinator, group registry, connection pumps
//! - **`gateway`** - WebSocket upgrade and inbound relay
//! - **`auth`** - JWT verification and credential extraction
//! - **`persistence`** - Message store trait, PostgreSQL and in-memory stores
//! - **`server`** - Server initialization, application state, configuration
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`error`** - Backend-specific error types
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── main.rs         - Server binary
//! ├── hub/            - Connection hub
//! ├── gateway/        - WebSocket gateway
//! ├── auth/           - Authentication
//! ├── persistence/    - Message storage
//! ├── server/         - Server initialization and state
//! ├── routes/         - Route configuration
//! └── error/          - Error types
//! ```
//!
//! # Message Flow
//!
//! ```text
//! client ──ws──> read pump ──ChatRelay──> HubHandle ──> coordinator
//!                                                        │ persist
//!                                                        │ stamp sender_id
//!                                                        ▼
//! client <──ws── write pump <── outbound queue <── fan-out (try_send)
//! ```

/// Connection hub
pub mod hub;

/// WebSocket gateway
pub mod gateway;

/// Authentication
pub mod auth;

/// Message persistence
pub mod persistence;

/// Server initialization and state
pub mod server;

/// HTTP routes
pub mod routes;

/// Backend error types
pub mod error;
