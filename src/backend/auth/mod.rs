//! Authentication Module
//!
//! Resolves the credential presented on a websocket handshake (or an HTTP
//! request) to an authenticated `Principal`.
//!
//! # Architecture
//!
//! - **`sessions`** - JWT claims, token verification (and issuance for tooling)
//! - **`identity`** - `Identity` trait, `JwtIdentity`, `Principal`, `AuthError`
//! - **`credentials`** - Token lookup in query string / Authorization header
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs          - Module exports and documentation
//! ├── sessions.rs     - JWT token management
//! ├── identity.rs     - Identity trait and JWT implementation
//! └── credentials.rs  - Credential extraction
//! ```
//!
//! # Authentication Flow
//!
//! 1. The gateway extracts the token (`?token=` first, then `Bearer`)
//! 2. `Identity::resolve` verifies it and yields the user id and display name
//! 3. Failure rejects the request with 401 before any upgrade happens
//!
//! Token issuance (signup/login) belongs to the account service.

/// JWT token generation and validation
pub mod sessions;

/// Identity resolution
pub mod identity;

/// Credential extraction from requests
pub mod credentials;

pub use credentials::extract_credential;
pub use identity::{AuthError, Identity, JwtIdentity, Principal};
pub use sessions::{create_token, verify_token, Claims};
