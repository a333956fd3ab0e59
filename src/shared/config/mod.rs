//! Hub configuration module
//!
//! Tuning knobs for the connection hub: queue sizes, heartbeat timings and
//! frame limits. Defaults match the values the chat service has always run
//! with; the server binary overrides them from the environment.

use std::time::Duration;
use thiserror::Error;

/// Default outbound queue capacity per connection
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Default coordinator inbox capacity
pub const DEFAULT_INBOX_CAPACITY: usize = 1024;

/// Default time allowed to hear from the peer before the connection is dropped
pub const DEFAULT_PONG_WAIT: Duration = Duration::from_secs(60);

/// Default time allowed to write one batch to the peer
pub const DEFAULT_WRITE_WAIT: Duration = Duration::from_secs(10);

/// Default maximum inbound frame size in bytes
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 512;

/// Default maximum number of queued payloads flushed together
pub const DEFAULT_MAX_BATCH: usize = 64;

/// Default bound on a single persistence call
pub const DEFAULT_PERSIST_TIMEOUT: Duration = Duration::from_secs(5);

/// Ping period derived from a pong wait (nine tenths of it)
pub fn ping_period_for(pong_wait: Duration) -> Duration {
    pong_wait * 9 / 10
}

/// Hub configuration
#[derive(Debug, Clone, PartialEq)]
pub struct HubConfig {
    /// Bounded outbound queue size for every connection
    pub queue_capacity: usize,
    /// Bounded size of the coordinator's event inbox
    pub inbox_capacity: usize,
    /// Read deadline, re-armed by every inbound frame
    pub pong_wait: Duration,
    /// Heartbeat interval; must be shorter than `pong_wait`
    pub ping_period: Duration,
    /// Write deadline for one flush
    pub write_wait: Duration,
    /// Largest inbound frame accepted
    pub max_message_size: usize,
    /// Largest number of queued payloads coalesced into one flush
    pub max_batch: usize,
    /// Bound on the persistence call made for each broadcast
    pub persist_timeout: Duration,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            inbox_capacity: DEFAULT_INBOX_CAPACITY,
            pong_wait: DEFAULT_PONG_WAIT,
            ping_period: ping_period_for(DEFAULT_PONG_WAIT),
            write_wait: DEFAULT_WRITE_WAIT,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            max_batch: DEFAULT_MAX_BATCH,
            persist_timeout: DEFAULT_PERSIST_TIMEOUT,
        }
    }
}

impl HubConfig {
    /// Create a new HubConfigBuilder
    pub fn builder() -> HubConfigBuilder {
        HubConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.queue_capacity == 0 {
            return Err(ConfigError::InvalidValue("queue_capacity must be greater than zero".into()));
        }
        if self.inbox_capacity == 0 {
            return Err(ConfigError::InvalidValue("inbox_capacity must be greater than zero".into()));
        }
        if self.max_message_size == 0 {
            return Err(ConfigError::InvalidValue("max_message_size must be greater than zero".into()));
        }
        if self.max_batch == 0 {
            return Err(ConfigError::InvalidValue("max_batch must be greater than zero".into()));
        }
        if self.ping_period.is_zero() || self.ping_period >= self.pong_wait {
            return Err(ConfigError::InvalidValue(format!(
                "ping_period ({:?}) must be non-zero and shorter than pong_wait ({:?})",
                self.ping_period, self.pong_wait
            )));
        }
        if self.write_wait.is_zero() || self.persist_timeout.is_zero() {
            return Err(ConfigError::InvalidValue("timeouts must be non-zero".into()));
        }
        Ok(())
    }
}

/// Builder for HubConfig
///
/// Unset fields keep their defaults. Setting `pong_wait` without an explicit
/// `ping_period` derives the ping period from it.
#[derive(Debug, Default)]
pub struct HubConfigBuilder {
    queue_capacity: Option<usize>,
    inbox_capacity: Option<usize>,
    pong_wait: Option<Duration>,
    ping_period: Option<Duration>,
    write_wait: Option<Duration>,
    max_message_size: Option<usize>,
    max_batch: Option<usize>,
    persist_timeout: Option<Duration>,
}

impl HubConfigBuilder {
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = Some(capacity);
        self
    }

    pub fn inbox_capacity(mut self, capacity: usize) -> Self {
        self.inbox_capacity = Some(capacity);
        self
    }

    pub fn pong_wait(mut self, wait: Duration) -> Self {
        self.pong_wait = Some(wait);
        self
    }

    pub fn ping_period(mut self, period: Duration) -> Self {
        self.ping_period = Some(period);
        self
    }

    pub fn write_wait(mut self, wait: Duration) -> Self {
        self.write_wait = Some(wait);
        self
    }

    pub fn max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = Some(size);
        self
    }

    pub fn max_batch(mut self, batch: usize) -> Self {
        self.max_batch = Some(batch);
        self
    }

    pub fn persist_timeout(mut self, timeout: Duration) -> Self {
        self.persist_timeout = Some(timeout);
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<HubConfig, ConfigError> {
        let defaults = HubConfig::default();
        let pong_wait = self.pong_wait.unwrap_or(defaults.pong_wait);
        let config = HubConfig {
            queue_capacity: self.queue_capacity.unwrap_or(defaults.queue_capacity),
            inbox_capacity: self.inbox_capacity.unwrap_or(defaults.inbox_capacity),
            pong_wait,
            ping_period: self.ping_period.unwrap_or_else(|| ping_period_for(pong_wait)),
            write_wait: self.write_wait.unwrap_or(defaults.write_wait),
            max_message_size: self.max_message_size.unwrap_or(defaults.max_message_size),
            max_batch: self.max_batch.unwrap_or(defaults.max_batch),
            persist_timeout: self.persist_timeout.unwrap_or(defaults.persist_timeout),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    InvalidValue(String),
    #[error("could not parse {name}={value}")]
    Unparseable { name: &'static str, value: String },
}
