//! Driving port for driver availability changes.

use async_trait::async_trait;

use crate::domain::{DriverId, DriverStatus, Error};

/// Driving port for drivers going on or off shift.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DriverAvailabilityCommand: Send + Sync {
    /// Set a driver to `available` or `offline`.
    ///
    /// `busy` is owned by trip acceptance and is rejected as an invalid
    /// request; a driver who is currently busy yields `conflict`.
    async fn set_status(
        &self,
        driver_id: DriverId,
        status: DriverStatus,
    ) -> Result<DriverStatus, Error>;
}
