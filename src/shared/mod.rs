//! Shared Module
//!
//! Types that do not depend on the server runtime: identifiers, the chat
//! envelope, sender stamping, hub configuration and shared errors.
//!
//! # Overview
//!
//! The hub itself treats payloads as opaque bytes. The types here give those
//! bytes their one agreed shape (`ChatMessage`) and define how the verified
//! sender id is written onto outbound copies (`stamp_sender`).

/// Identifiers and the chat message envelope
pub mod message;

/// Sender id stamping for outbound payloads
pub mod envelope;

/// Shared error types
pub mod error;

/// Hub configuration
pub mod config;

pub use config::{ConfigError, HubConfig, HubConfigBuilder};
pub use envelope::{stamp_sender, StampedEnvelope};
pub use error::SharedError;
pub use message::{ChatMessage, ClientMessage, GroupId, UserId};
