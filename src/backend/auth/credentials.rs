/**
 * Credential Extraction
 *
 * Browsers cannot set headers on a websocket handshake, so the token is
 * looked up in the `token` query parameter first and in the
 * `Authorization: Bearer <token>` header second.
 */
use axum::http::{header::AUTHORIZATION, HeaderMap};

use crate::backend::auth::identity::AuthError;

/// Pick the caller's credential out of a request
pub fn extract_credential(query_token: Option<&str>, headers: &HeaderMap) -> Result<String, AuthError> {
    if let Some(token) = query_token.map(str::trim).filter(|t| !t.is_empty()) {
        return Ok(token.to_string());
    }

    let header = match headers.get(AUTHORIZATION) {
        Some(value) => value,
        None => {
            tracing::debug!("Missing token query parameter and Authorization header");
            return Err(AuthError::MissingCredential);
        }
    };

    let token = header
        .to_str()
        .ok()
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            tracing::warn!("Invalid Authorization header format");
            AuthError::MissingCredential
        })?;

    Ok(token.to_string())
}
