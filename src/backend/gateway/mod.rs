//! WebSocket Gateway
//!
//! Bridges axum websockets to the hub.
//!
//! - **`handlers`** - `GET /ws/{group_id}`: authentication, upgrade, and the
//!   per-connection pump pair
//! - **`relay`** - `ChatRelay`, which turns client frames into chat messages
//!   signed with the verified sender

/// Upgrade handler and socket serving
pub mod handlers;

/// Inbound message relay
pub mod relay;

pub use handlers::{ws_handler, WsQuery};
pub use relay::ChatRelay;
