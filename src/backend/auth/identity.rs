/**
 * Identity Resolution
 *
 * The gateway resolves a caller's credential to a `Principal` before any
 * websocket upgrade happens. The hub never sees credentials, only the
 * resolved user id.
 */
use async_trait::async_trait;
use thiserror::Error;

use crate::backend::auth::sessions::verify_token;
use crate::shared::UserId;

/// Display name used when a token carries no username
pub const FALLBACK_DISPLAY_NAME: &str = "User";

/// An authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub display_name: String,
}

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing credential")]
    MissingCredential,

    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("credential rejected: {0}")]
    Rejected(String),
}

/// Resolves a credential to a principal
#[async_trait]
pub trait Identity: Send + Sync {
    async fn resolve(&self, credential: &str) -> Result<Principal, AuthError>;
}

/// JWT-backed identity
#[derive(Clone)]
pub struct JwtIdentity {
    secret: Vec<u8>,
}

impl JwtIdentity {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self { secret: secret.into() }
    }
}

impl std::fmt::Debug for JwtIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtIdentity").finish_non_exhaustive()
    }
}

#[async_trait]
impl Identity for JwtIdentity {
    async fn resolve(&self, credential: &str) -> Result<Principal, AuthError> {
        let claims = verify_token(&self.secret, credential)?;
        if claims.user_id <= 0 {
            return Err(AuthError::Rejected(format!("invalid user id {}", claims.user_id)));
        }

        let display_name = claims
            .username
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_DISPLAY_NAME.to_string());

        Ok(Principal {
            user_id: UserId(claims.user_id),
            display_name,
        })
    }
}
