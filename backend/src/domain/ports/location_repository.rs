//! Port for the append-only location history.

use async_trait::async_trait;

use crate::domain::LocationUpdate;

use super::define_port_error;

define_port_error! {
    /// Errors raised by location history adapters.
    pub enum LocationRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "location repository connection failed: {message}",
        /// Insert failed during execution.
        Query { message: String } =>
            "location repository query failed: {message}",
    }
}

/// Port for appending driver positions to durable history.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LocationRepository: Send + Sync {
    /// Append one location sample. Samples are never updated or deleted.
    async fn append(&self, update: &LocationUpdate) -> Result<(), LocationRepositoryError>;
}
