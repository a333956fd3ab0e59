/**
 * Session Tokens
 *
 * HS256 JWT issuance and verification. Tokens are issued by the account
 * service; the hub only verifies them. `create_token` exists for tooling
 * and tests.
 */
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::shared::UserId;

/// Token lifetime issued by `create_token` (30 days)
pub const TOKEN_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// User ID
    pub user_id: i64,
    /// Username (optional for older tokens)
    #[serde(default)]
    pub username: Option<String>,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    /// Issued at time (Unix timestamp)
    pub iat: u64,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Create a JWT token for a user
///
/// # Arguments
/// * `secret` - HMAC signing secret
/// * `user_id` - User ID
/// * `username` - Display name carried in the token, if any
pub fn create_token(
    secret: &[u8],
    user_id: UserId,
    username: Option<String>,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = now_secs();
    let claims = Claims {
        user_id: user_id.0,
        username,
        exp: now + TOKEN_TTL_SECS,
        iat: now,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret))
}

/// Verify and decode a JWT token
///
/// Signature, algorithm (HS256) and expiry are all checked.
pub fn verify_token(secret: &[u8], token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(token, &DecodingKey::from_secret(secret), &Validation::default())?;
    Ok(token_data.claims)
}
