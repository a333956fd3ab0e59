/**
 * WebSocket Gateway Handlers
 *
 * `GET /ws/{group_id}` authenticates the caller, validates the group and
 * upgrades. Each upgraded socket becomes one hub `Connection` served by a
 * read pump (on the upgrade task) and a write pump (on its own task).
 *
 * # Query Parameters
 *
 * - `token` - JWT credential; the `Authorization: Bearer` header is used
 *   when absent
 *
 * # Rejections
 *
 * - 401 - Missing or invalid credential (nothing is registered)
 * - 400 - Blank group id
 */

use axum::{
    extract::{
        ws::{rejection::WebSocketUpgradeRejection, Message, WebSocket, WebSocketUpgrade},
        Path, Query, State,
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use futures_util::{future::ready, SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::oneshot;

use crate::backend::auth::{extract_credential, Principal};
use crate::backend::error::BackendError;
use crate::backend::gateway::relay::ChatRelay;
use crate::backend::hub::{read_pump, write_pump, Connection, Frame, PumpConfig};
use crate::backend::server::state::AppState;
use crate::shared::GroupId;

/// Query parameters accepted on the upgrade request
#[derive(Debug, Default, Deserialize)]
pub struct WsQuery {
    pub token: Option<String>,
}

/// Handle a websocket upgrade for a group
pub async fn ws_handler(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
    Query(query): Query<WsQuery>,
    headers: HeaderMap,
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<Response, BackendError> {
    let credential = extract_credential(query.token.as_deref(), &headers)?;
    let principal = state.identity.resolve(&credential).await?;

    let group_id = GroupId::new(group_id).map_err(|e| BackendError::handler(StatusCode::BAD_REQUEST, e.to_string()))?;

    let upgrade = match upgrade {
        Ok(upgrade) => upgrade,
        Err(rejection) => {
            tracing::debug!(group = %group_id, error = %rejection, "[Gateway] Not a websocket upgrade");
            return Ok(rejection.into_response());
        }
    };

    tracing::info!(group = %group_id, user = %principal.user_id, "[Gateway] Upgrading connection");

    let max_message_size = state.hub_config.max_message_size;
    Ok(upgrade
        .max_message_size(max_message_size)
        .max_frame_size(max_message_size)
        .on_upgrade(move |socket| serve_socket(socket, state, principal, group_id)))
}

/// Run one upgraded connection to completion
async fn serve_socket(socket: WebSocket, state: AppState, principal: Principal, group_id: GroupId) {
    let (connection, queue) = Connection::new(group_id.clone(), principal.user_id, state.hub_config.queue_capacity);
    let handle = connection.handle();

    if let Err(e) = state.hub.register(connection).await {
        tracing::error!(id = %handle.id, error = %e, "[Gateway] Could not register connection");
        return;
    }

    let pump_config = PumpConfig::from(&*state.hub_config);
    let (sink, stream) = socket.split();
    let sink = sink.with(|frame: Frame| ready(Ok::<_, axum::Error>(frame_to_message(frame))));
    let stream = stream.map(|message| message.map(message_to_frame));

    let (writer_done_tx, writer_done_rx) = oneshot::channel::<()>();
    let writer = {
        let handle = handle.clone();
        let pump_config = pump_config.clone();
        tokio::spawn(async move {
            let exit = write_pump(sink, queue, &handle, &pump_config).await;
            let _ = writer_done_tx.send(());
            exit
        })
    };

    let mut relay = ChatRelay::new(state.hub.clone(), group_id, principal);
    let read_exit = read_pump(stream, &handle, &state.hub, &pump_config, &mut relay, async {
        let _ = writer_done_rx.await;
    })
    .await;

    // Unregistering closes the queue, which lets the writer finish.
    match writer.await {
        Ok(write_exit) => {
            tracing::info!(id = %handle.id, group = %handle.group_id, ?read_exit, ?write_exit, "[Gateway] Connection closed");
        }
        Err(e) => {
            tracing::error!(id = %handle.id, error = %e, "[Gateway] Write pump task failed");
        }
    }
}

fn message_to_frame(message: Message) -> Frame {
    match message {
        Message::Text(text) => Frame::Text(Bytes::copy_from_slice(text.as_str().as_bytes())),
        Message::Binary(data) => Frame::Binary(data),
        Message::Ping(data) => Frame::Ping(data),
        Message::Pong(data) => Frame::Pong(data),
        Message::Close(_) => Frame::Close,
    }
}

fn frame_to_message(frame: Frame) -> Message {
    match frame {
        Frame::Text(payload) => match String::from_utf8(payload.to_vec()) {
            Ok(text) => Message::Text(text.into()),
            Err(_) => Message::Binary(payload),
        },
        Frame::Binary(payload) => Message::Binary(payload),
        Frame::Ping(payload) => Message::Ping(payload),
        Frame::Pong(payload) => Message::Pong(payload),
        Frame::Close => Message::Close(None),
    }
}
