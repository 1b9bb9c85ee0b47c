//! Driver availability domain service.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{DriverAvailabilityCommand, DriverRepository, DriverRepositoryError};
use crate::domain::{DriverId, DriverStatus, Error};

fn map_repository_error(error: DriverRepositoryError) -> Error {
    match error {
        DriverRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("driver repository unavailable: {message}"))
        }
        DriverRepositoryError::Query { message } => {
            Error::internal(format!("driver repository error: {message}"))
        }
    }
}

/// Driver service implementing [`DriverAvailabilityCommand`].
#[derive(Clone)]
pub struct DriverAvailabilityService<R> {
    driver_repo: Arc<R>,
}

impl<R> DriverAvailabilityService<R> {
    /// Create a service over the driver repository.
    pub fn new(driver_repo: Arc<R>) -> Self {
        Self { driver_repo }
    }
}

#[async_trait]
impl<R> DriverAvailabilityCommand for DriverAvailabilityService<R>
where
    R: DriverRepository,
{
    async fn set_status(
        &self,
        driver_id: DriverId,
        status: DriverStatus,
    ) -> Result<DriverStatus, Error> {
        if status == DriverStatus::Busy {
            return Err(Error::invalid_request(
                "drivers become busy by accepting a trip",
            )
            .with_details(json!({ "field": "status", "code": "not_settable" })));
        }

        let updated = self
            .driver_repo
            .update_availability(&driver_id, status)
            .await
            .map_err(map_repository_error)?;
        if updated {
            info!(driver_id = %driver_id, status = %status, "driver availability changed");
            return Ok(status);
        }

        match self
            .driver_repo
            .find_status(&driver_id)
            .await
            .map_err(map_repository_error)?
        {
            None => Err(Error::not_found(format!("driver {driver_id} not found"))),
            Some(current) => Err(Error::conflict(format!(
                "driver {driver_id} is {current} and cannot change availability"
            ))
            .with_details(json!({ "driverId": driver_id, "currentStatus": current }))),
        }
    }
}
