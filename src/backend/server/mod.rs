//! Server Module
//!
//! This module contains all server-side code for initializing and configuring
//! the Axum HTTP server.
//!
//! # Architecture
//!
//! - **`state`** - Application state structure and `FromRef` implementations
//! - **`config`** - Environment configuration and database loading
//! - **`init`** - Server initialization and app creation
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs          - Module exports and documentation
//! ├── state.rs        - AppState and FromRef implementations
//! ├── config.rs       - Configuration loading (env, database)
//! └── init.rs         - Server initialization and app creation
//! ```
//!
//! # Initialization Flow
//!
//! 1. **Configuration Loading**: `ServerConfig::from_env`
//! 2. **Store Selection**: PostgreSQL when reachable, in-memory otherwise
//! 3. **Hub Startup**: the coordinator is spawned on its own task
//! 4. **Router Creation**: routes plus trace and timeout layers
//!
//! # Example
//!
//! ```rust,no_run
//! use studyhub::backend::server::{create_app, ServerConfig};
//!
//! # async fn example() {
//! let config = ServerConfig::from_env().unwrap();
//! let app = create_app(&config).await;
//! # }
//! ```

/// Application state management
pub mod state;

/// Server configuration loading
pub mod config;

/// Server initialization
pub mod init;

pub use config::ServerConfig;
pub use init::{build_state, create_app};
pub use state::AppState;
