//! Port for driver availability writes.

use async_trait::async_trait;

use crate::domain::{DriverId, DriverStatus};

use super::define_port_error;

define_port_error! {
    /// Errors raised by driver repository adapters.
    pub enum DriverRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "driver repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "driver repository query failed: {message}",
    }
}

/// Port for toggling whether a driver takes trips.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DriverRepository: Send + Sync {
    /// Set the driver's status unless the driver is currently busy.
    ///
    /// Returns `false` when no non-busy driver with that id exists.
    async fn update_availability(
        &self,
        driver_id: &DriverId,
        status: DriverStatus,
    ) -> Result<bool, DriverRepositoryError>;

    /// Read the driver's current status, if the driver exists.
    async fn find_status(
        &self,
        driver_id: &DriverId,
    ) -> Result<Option<DriverStatus>, DriverRepositoryError>;
}
