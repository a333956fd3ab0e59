/**
 * Server Initialization
 *
 * This module handles the initialization and setup of the Axum HTTP server,
 * including store selection, hub startup, and route configuration.
 *
 * # Initialization Process
 *
 * 1. Load the database (if `DATABASE_URL` is set) and pick a message store
 * 2. Build the identity resolver from the JWT secret
 * 3. Spawn the hub coordinator
 * 4. Create and configure the router
 */

use axum::Router;
use std::sync::Arc;

use crate::backend::auth::{Identity, JwtIdentity};
use crate::backend::hub::Hub;
use crate::backend::persistence::{MemoryMessageStore, MessageStore, PgMessageStore};
use crate::backend::routes::router::create_router;
use crate::backend::server::config::{load_database, ServerConfig};
use crate::backend::server::state::AppState;
use crate::shared::HubConfig;

/// Create and configure the Axum application
///
/// # Error Handling
///
/// The function is designed to be resilient:
/// - Missing or unreachable database: messages are kept in memory
/// - Migration failures: logged but don't prevent startup
pub async fn create_app(config: &ServerConfig) -> Router<()> {
    tracing::info!("Initializing studyhub server");

    let store: Arc<dyn MessageStore> = match &config.database_url {
        Some(url) => match load_database(url).await {
            Some(pool) => Arc::new(PgMessageStore::new(pool)),
            None => Arc::new(MemoryMessageStore::new()),
        },
        None => {
            tracing::warn!("DATABASE_URL not set, messages will not survive a restart");
            Arc::new(MemoryMessageStore::new())
        }
    };

    let identity: Arc<dyn Identity> = Arc::new(JwtIdentity::new(config.jwt_secret.as_bytes()));

    let app_state = build_state(store, identity, config.hub.clone());
    tracing::info!("Hub started");

    create_router(app_state, config.handshake_timeout)
}

/// Spawn a hub over `store` and wrap everything in an `AppState`
///
/// Must be called from within a tokio runtime.
pub fn build_state(store: Arc<dyn MessageStore>, identity: Arc<dyn Identity>, hub_config: HubConfig) -> AppState {
    let hub = Hub::spawn(store.clone(), &hub_config);
    AppState::new(hub, identity, store, hub_config)
}
