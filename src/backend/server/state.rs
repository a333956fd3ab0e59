/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * the necessary `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * The `AppState` struct holds:
 * - The hub handle (the only way to reach the coordinator)
 * - The identity resolver used before any upgrade
 * - The message store, for history reads
 * - The hub configuration, for per-connection pump settings
 *
 * Every field is cheap to clone: the hub handle wraps a channel sender and
 * the rest sit behind `Arc`.
 *
 * # Example
 *
 * ```rust
 * use studyhub::backend::hub::HubHandle;
 * use axum::extract::State;
 *
 * async fn handler(State(hub): State<HubHandle>) {
 *     let snapshot = hub.snapshot().await;
 *     // ...
 * }
 * ```
 */

use axum::extract::FromRef;
use std::sync::Arc;

use crate::backend::auth::Identity;
use crate::backend::hub::HubHandle;
use crate::backend::persistence::MessageStore;
use crate::shared::HubConfig;

/// Shared state for every handler
#[derive(Clone)]
pub struct AppState {
    /// Handle to the hub coordinator
    pub hub: HubHandle,

    /// Credential resolver
    pub identity: Arc<dyn Identity>,

    /// Message store, shared with the coordinator
    pub store: Arc<dyn MessageStore>,

    /// Limits and timings applied to each connection
    pub hub_config: Arc<HubConfig>,
}

impl AppState {
    pub fn new(
        hub: HubHandle,
        identity: Arc<dyn Identity>,
        store: Arc<dyn MessageStore>,
        hub_config: HubConfig,
    ) -> Self {
        Self {
            hub,
            identity,
            store,
            hub_config: Arc::new(hub_config),
        }
    }
}

impl FromRef<AppState> for HubHandle {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.hub.clone()
    }
}

impl FromRef<AppState> for Arc<dyn Identity> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.identity.clone()
    }
}

impl FromRef<AppState> for Arc<dyn MessageStore> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.store.clone()
    }
}
