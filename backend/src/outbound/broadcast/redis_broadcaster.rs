//! Redis pub/sub adapter for the location topic.
//!
//! Connections come from a `bb8` pool managed by `bb8-redis`. Each publish
//! checks out a multiplexed connection, issues `PUBLISH`, and returns it.

use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::bb8::{Pool, RunError};
use bb8_redis::redis::{AsyncCommands, RedisError};
use bb8_redis::RedisConnectionManager;
use tracing::debug;

use crate::domain::ports::{LocationBroadcastError, LocationBroadcaster};

/// Errors raised while building the Redis pool.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RedisPoolError {
    /// The Redis URL could not be parsed.
    #[error("invalid redis url: {message}")]
    InvalidUrl { message: String },
    /// The pool could not open its initial connections.
    #[error("failed to build redis pool: {message}")]
    Build { message: String },
}

/// Configuration for the Redis connection pool.
#[derive(Debug, Clone)]
pub struct RedisPoolConfig {
    redis_url: String,
    channel: String,
    max_size: u32,
    connection_timeout: Duration,
}

impl RedisPoolConfig {
    /// Create a configuration publishing to `channel` on `redis_url`.
    ///
    /// Defaults to 16 pooled connections and a 5 second checkout timeout.
    pub fn new(redis_url: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            redis_url: redis_url.into(),
            channel: channel.into(),
            max_size: 16,
            connection_timeout: Duration::from_secs(5),
        }
    }

    /// Set the maximum number of pooled connections.
    #[must_use]
    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size;
        self
    }

    /// Set the connection checkout timeout.
    #[must_use]
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Channel that receives location payloads.
    pub fn channel(&self) -> &str {
        &self.channel
    }
}

/// Publishes location payloads to a Redis channel.
#[derive(Clone)]
pub struct RedisLocationBroadcaster {
    pool: Pool<RedisConnectionManager>,
    channel: String,
}

impl RedisLocationBroadcaster {
    /// Build the pool and broadcaster.
    ///
    /// # Errors
    ///
    /// Returns [`RedisPoolError`] if the URL is invalid or the pool cannot be
    /// constructed.
    pub async fn connect(config: RedisPoolConfig) -> Result<Self, RedisPoolError> {
        let manager = RedisConnectionManager::new(config.redis_url.as_str()).map_err(|err| {
            RedisPoolError::InvalidUrl {
                message: err.to_string(),
            }
        })?;
        let pool = Pool::builder()
            .max_size(config.max_size)
            .connection_timeout(config.connection_timeout)
            .build(manager)
            .await
            .map_err(|err| RedisPoolError::Build {
                message: err.to_string(),
            })?;

        Ok(Self {
            pool,
            channel: config.channel,
        })
    }
}

fn map_checkout_error(error: RunError<RedisError>) -> LocationBroadcastError {
    LocationBroadcastError::connection(error.to_string())
}

fn map_redis_error(error: &RedisError) -> LocationBroadcastError {
    if error.is_io_error() || error.is_connection_dropped() || error.is_timeout() {
        LocationBroadcastError::connection(error.to_string())
    } else {
        LocationBroadcastError::publish(error.to_string())
    }
}

#[async_trait]
impl LocationBroadcaster for RedisLocationBroadcaster {
    async fn publish(&self, payload: &str) -> Result<(), LocationBroadcastError> {
        let mut conn = self.pool.get().await.map_err(map_checkout_error)?;
        let receivers: i64 = conn
            .publish(self.channel.as_str(), payload)
            .await
            .map_err(|err| map_redis_error(&err))?;
        debug!(channel = %self.channel, receivers, "location published");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn config_defaults() {
        let config = RedisPoolConfig::new("redis://127.0.0.1/", "locations");
        assert_eq!(config.channel(), "locations");
        assert_eq!(config.max_size, 16);
        assert_eq!(config.connection_timeout, Duration::from_secs(5));
    }

    #[rstest]
    fn config_builder_overrides() {
        let config = RedisPoolConfig::new("redis://127.0.0.1/", "locations")
            .with_max_size(4)
            .with_connection_timeout(Duration::from_millis(250));
        assert_eq!(config.max_size, 4);
        assert_eq!(config.connection_timeout, Duration::from_millis(250));
    }

    #[rstest]
    #[tokio::test]
    async fn rejects_unparseable_url() {
        let result =
            RedisLocationBroadcaster::connect(RedisPoolConfig::new("not a url", "locations")).await;
        assert!(matches!(result, Err(RedisPoolError::InvalidUrl { .. })));
    }
}
