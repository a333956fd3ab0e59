/**
 * Sender Stamping
 *
 * Broadcast payloads are stamped with the server-verified sender id before
 * they are fanned out. The stamp is written through a typed envelope rather
 * than by poking a key into an untyped map, so the `sender_id` field is
 * always present on the outbound copy and always comes from the hub.
 */
use bytes::Bytes;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::shared::error::SharedError;
use crate::shared::message::UserId;

/// Outbound shape of a stamped payload
///
/// `body` holds the original payload's fields minus any `sender_id` the
/// client tried to supply.
#[derive(Debug, Serialize)]
pub struct StampedEnvelope {
    pub sender_id: UserId,
    #[serde(flatten)]
    pub body: Map<String, Value>,
}

impl StampedEnvelope {
    pub fn from_payload(payload: &[u8], sender_id: UserId) -> Result<Self, SharedError> {
        let mut body = match serde_json::from_slice::<Value>(payload)? {
            Value::Object(body) => body,
            _ => return Err(SharedError::envelope("payload is not a JSON object")),
        };
        body.remove("sender_id");
        Ok(Self { sender_id, body })
    }

    pub fn to_bytes(&self) -> Result<Bytes, SharedError> {
        Ok(Bytes::from(serde_json::to_vec(self)?))
    }
}

/// Stamp `sender_id` onto a payload
///
/// JSON objects come back re-encoded with the verified sender id. Anything
/// else is returned unchanged; enrichment never blocks delivery.
pub fn stamp_sender(payload: &Bytes, sender_id: UserId) -> Bytes {
    match StampedEnvelope::from_payload(payload, sender_id).and_then(|env| env.to_bytes()) {
        Ok(stamped) => stamped,
        Err(e) => {
            tracing::debug!(error = %e, "Payload left unstamped");
            payload.clone()
        }
    }
}
