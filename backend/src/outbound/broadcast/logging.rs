//! Broadcaster used when no Redis bus is configured.

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{LocationBroadcastError, LocationBroadcaster};

/// Broadcaster that logs each payload at debug level and always succeeds.
#[derive(Debug, Clone)]
pub struct LoggingLocationBroadcaster {
    channel: String,
}

impl LoggingLocationBroadcaster {
    /// Create a broadcaster reporting the given channel name in its logs.
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
        }
    }
}

#[async_trait]
impl LocationBroadcaster for LoggingLocationBroadcaster {
    async fn publish(&self, payload: &str) -> Result<(), LocationBroadcastError> {
        debug!(channel = %self.channel, bytes = payload.len(), "location broadcast (no bus configured)");
        Ok(())
    }
}
