/**
 * Router Configuration
 *
 * This module provides the main router creation function that combines
 * all route configurations into a single Axum router.
 *
 * # Route Order
 *
 * 1. WebSocket gateway (`/ws/{group_id}`)
 * 2. API routes (health, history)
 * 3. Fallback handler (404)
 *
 * Every request gets a `TraceLayer` span; `TimeoutLayer` answers 408 when a
 * request (including a websocket handshake) outlives the handshake timeout.
 * Upgraded sockets are not subject to it.
 */

use axum::{http::StatusCode, routing::get, Router};
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::backend::gateway::ws_handler;
use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::server::state::AppState;

/// Create the Axum router with all routes configured
///
/// # Arguments
///
/// * `app_state` - Application state
/// * `handshake_timeout` - Upper bound on any request before its response
pub fn create_router(app_state: AppState, handshake_timeout: Duration) -> Router<()> {
    let router = Router::new().route("/ws/{group_id}", get(ws_handler));

    let router = configure_api_routes(router);

    let router = router.fallback(|| async { (StatusCode::NOT_FOUND, "404 Not Found") });

    router
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, handshake_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
