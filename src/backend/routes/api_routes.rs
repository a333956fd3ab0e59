/**
 * API Route Handlers
 *
 * # Routes
 *
 * - `GET /health` - Liveness plus current hub membership counts
 * - `GET /groups/{group_id}/messages?limit=` - Recent history of a group
 *   (requires authentication)
 */

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::backend::auth::{extract_credential, Identity};
use crate::backend::error::BackendError;
use crate::backend::hub::HubHandle;
use crate::backend::persistence::{clamp_history_limit, MessageStore, StoredMessage};
use crate::backend::server::state::AppState;
use crate::shared::GroupId;

/// Configure API routes
///
/// Adds `/health` and `/groups/{group_id}/messages` to the router.
pub fn configure_api_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/health", get(health))
        .route("/groups/{group_id}/messages", get(group_history))
}

/// Body of `GET /health`
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
    pub groups: usize,
    pub connections: usize,
}

pub async fn health(State(hub): State<HubHandle>) -> Result<Json<HealthResponse>, BackendError> {
    let snapshot = hub.snapshot().await?;
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        groups: snapshot.group_count(),
        connections: snapshot.connection_count(),
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub token: Option<String>,
    pub limit: Option<i64>,
}

/// Get the most recent messages of a group, oldest first
///
/// # Authentication
///
/// Same credential rules as the websocket route: `?token=` or
/// `Authorization: Bearer`.
pub async fn group_history(
    State(identity): State<Arc<dyn Identity>>,
    State(store): State<Arc<dyn MessageStore>>,
    Path(group_id): Path<String>,
    Query(query): Query<HistoryQuery>,
    headers: HeaderMap,
) -> Result<Json<Vec<StoredMessage>>, BackendError> {
    let credential = extract_credential(query.token.as_deref(), &headers)?;
    let principal = identity.resolve(&credential).await?;

    let group_id = GroupId::new(group_id).map_err(|e| BackendError::handler(StatusCode::BAD_REQUEST, e.to_string()))?;
    let limit = clamp_history_limit(query.limit);

    tracing::debug!(group = %group_id, user = %principal.user_id, limit, "Fetching group history");
    let messages = store.history(&group_id, limit).await?;

    Ok(Json(messages))
}
