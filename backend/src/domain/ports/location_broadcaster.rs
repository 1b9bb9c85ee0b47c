//! Port for fanning raw location payloads out to subscribers.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by broadcast bus adapters.
    pub enum LocationBroadcastError {
        /// The bus could not be reached.
        Connection { message: String } =>
            "location broadcast connection failed: {message}",
        /// The bus refused or failed the publish.
        Publish { message: String } =>
            "location broadcast publish failed: {message}",
    }
}

/// Publish-only access to the location topic.
///
/// Payloads are forwarded verbatim as received from the driver.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LocationBroadcaster: Send + Sync {
    /// Publish one serialized location update.
    async fn publish(&self, payload: &str) -> Result<(), LocationBroadcastError>;
}
