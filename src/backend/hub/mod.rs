//! Connection Hub
//!
//! Manages live client connections grouped by conversation, and fans every
//! accepted message out to the connections of its group after handing it to
//! persistence.
//!
//! # Architecture
//!
//! - **`connection`** - `Connection` (registry side, owns the outbound queue
//!   sender) and `ConnectionHandle` (what the pumps keep)
//! - **`registry`** - `GroupRegistry`, group id to member set
//! - **`event`** - `HubEvent`, `BroadcastEvent`, `HubSnapshot`
//! - **`coordinator`** - `Hub` (the single task that owns the registry) and
//!   `HubHandle` (the cloneable way to reach it)
//! - **`pump`** - read and write pumps over a `Frame` transport
//!
//! # Concurrency
//!
//! One coordinator task serves every group. The registry is never shared:
//! all mutation happens inside that task in response to events on its
//! inbox. Each connection adds two tasks of its own (read and write pump).
//! The outbound queue is written only by the coordinator and closed only by
//! the coordinator, when it drops the `Connection` on unregistration or
//! eviction.
//!
//! ```text
//! gateway ──register──▶ ┌──────────────┐
//! read pump ─unregister▶│ coordinator  │──try_send──▶ outbound queue ──▶ write pump
//! relay ───broadcast──▶ │ (registry)   │──save──────▶ MessageStore
//!                       └──────────────┘
//! ```

/// Connection halves and outbound queue
pub mod connection;

/// Group membership registry
pub mod registry;

/// Coordinator events
pub mod event;

/// Coordinator task and handle
pub mod coordinator;

/// Read and write pumps
pub mod pump;

pub use connection::{Connection, ConnectionHandle, ConnectionId, DeliveryFailure, OutboundQueue};
pub use coordinator::{Hub, HubError, HubHandle};
pub use event::{BroadcastEvent, HubEvent, HubSnapshot};
pub use pump::{read_pump, write_pump, Frame, InboundHandler, PumpConfig, ReadExit, WriteExit};
pub use registry::GroupRegistry;
