//! Route Configuration Module
//!
//! This module configures all HTTP routes for the backend server.
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs          - Module exports and documentation
//! ├── router.rs       - Main router creation and layers
//! └── api_routes.rs   - Health and history handlers
//! ```
//!
//! # Routes
//!
//! - `GET /ws/{group_id}` - WebSocket chat for a group (see `backend::gateway`)
//! - `GET /groups/{group_id}/messages` - Recent history (authenticated)
//! - `GET /health` - Hub membership counts

/// Main router creation
pub mod router;

/// API endpoint handlers
pub mod api_routes;

pub use router::create_router;
