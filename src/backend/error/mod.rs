//! Backend Error Module
//!
//! Error types returned by HTTP handlers, converted to JSON responses.
//!
//! # Architecture
//!
//! - **`types`** - `BackendError` and its status code mapping
//! - **`conversion`** - `IntoResponse` implementation
//!
//! # Module Structure
//!
//! ```text
//! error/
//! ├── mod.rs        - Module exports and documentation
//! ├── types.rs      - Error type definitions
//! └── conversion.rs - Error conversion implementations
//! ```
//!
//! Errors inside a live connection (transport failures, slow consumers,
//! persistence failures during broadcast) are not `BackendError`s: they
//! are handled locally by the hub and only logged.

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

pub use types::BackendError;
