/**
 * Server Configuration
 *
 * Configuration is read from environment variables (a `.env` file is
 * loaded by the binary first, when present). Hub tuning falls back to the
 * `HubConfig` defaults; anything set but unparseable is an error.
 *
 * | Variable                  | Default       |
 * |---------------------------|---------------|
 * | `SERVER_PORT`             | 3000          |
 * | `DATABASE_URL`            | unset (memory store) |
 * | `JWT_SECRET`              | dev fallback, logged |
 * | `HANDSHAKE_TIMEOUT_SECS`  | 10            |
 * | `HUB_QUEUE_CAPACITY`      | 256           |
 * | `HUB_PONG_WAIT_SECS`      | 60            |
 * | `HUB_WRITE_WAIT_SECS`     | 10            |
 * | `HUB_MAX_MESSAGE_SIZE`    | 512           |
 */

use sqlx::PgPool;
use std::str::FromStr;
use std::time::Duration;

use crate::shared::{ConfigError, HubConfig};

/// Secret used when `JWT_SECRET` is unset; never suitable for production
pub const DEV_JWT_SECRET: &str = "dev-secret-change-in-production";

/// Top-level server configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub port: u16,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    /// Bound on the HTTP request / websocket handshake
    pub handshake_timeout: Duration,
    pub hub: HubConfig,
}

impl ServerConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = parse_var(&lookup, "SERVER_PORT")?.unwrap_or(3000);
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        let jwt_secret = match lookup("JWT_SECRET").filter(|s| !s.is_empty()) {
            Some(secret) => secret,
            None => {
                tracing::warn!("JWT_SECRET not set, using development secret");
                DEV_JWT_SECRET.to_string()
            }
        };
        let handshake_timeout = Duration::from_secs(parse_var(&lookup, "HANDSHAKE_TIMEOUT_SECS")?.unwrap_or(10));

        let mut hub = HubConfig::builder();
        if let Some(capacity) = parse_var(&lookup, "HUB_QUEUE_CAPACITY")? {
            hub = hub.queue_capacity(capacity);
        }
        if let Some(secs) = parse_var(&lookup, "HUB_PONG_WAIT_SECS")? {
            hub = hub.pong_wait(Duration::from_secs(secs));
        }
        if let Some(secs) = parse_var(&lookup, "HUB_WRITE_WAIT_SECS")? {
            hub = hub.write_wait(Duration::from_secs(secs));
        }
        if let Some(size) = parse_var(&lookup, "HUB_MAX_MESSAGE_SIZE")? {
            hub = hub.max_message_size(size);
        }

        Ok(Self {
            port,
            database_url,
            jwt_secret,
            handshake_timeout,
            hub: hub.build()?,
        })
    }
}

fn parse_var<F, T>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Unparseable { name, value }),
    }
}

/// Connect to PostgreSQL and apply migrations
///
/// # Returns
///
/// - `Some(PgPool)` if the database is reachable
/// - `None` if the connection fails; the server then runs on the
///   in-memory store
///
/// Migration failures are logged and do not prevent startup.
pub async fn load_database(database_url: &str) -> Option<PgPool> {
    tracing::info!("Connecting to database...");

    let pool = match PgPool::connect(database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to create database connection pool: {:?}", e);
            tracing::warn!("Falling back to in-memory message store");
            return None;
        }
    };

    tracing::info!("Running database migrations...");
    match sqlx::migrate!().run(&pool).await {
        Ok(_) => tracing::info!("Database migrations completed successfully"),
        Err(e) => {
            tracing::error!("Failed to run database migrations: {}", e);
            tracing::warn!("Continuing without migrations - database might not be up to date");
        }
    }

    Some(pool)
}
