//! Common test utilities and helpers
//!
//! This module provides shared utilities for all tests including:
//! - In-memory websocket transports for driving the pumps
//! - Message stores with scripted behavior
//! - Authentication test helpers

pub mod transport;

// Re-export commonly used utilities
pub use auth_helpers::*;
pub use stores::*;
pub use transport::*;
