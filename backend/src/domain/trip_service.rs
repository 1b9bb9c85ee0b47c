//! Trip lifecycle domain service.
//!
//! Transitions are delegated to the repository as single conditional writes;
//! the store decides which of several concurrent callers wins. When a write
//! matches nothing, a follow-up status read tells an unknown trip apart from
//! one in the wrong state. That read only shapes the error and never gates
//! the write.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{
    RequestTripRequest, TripLifecycleCommand, TripRepository, TripRepositoryError,
};
use crate::domain::{DriverId, Error, Trip, TripId, TripStatus, TripStatusChange, TripTransition};

fn map_repository_error(error: TripRepositoryError) -> Error {
    match error {
        TripRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("trip repository unavailable: {message}"))
        }
        TripRepositoryError::Query { message } => {
            Error::internal(format!("trip repository error: {message}"))
        }
    }
}

fn refused(trip_id: TripId, transition: &TripTransition, current: Option<TripStatus>) -> Error {
    match current {
        None => Error::not_found(format!("trip {trip_id} not found")),
        Some(current) => Error::conflict(format!(
            "trip {trip_id} is {current} and cannot {}",
            transition.name()
        ))
        .with_details(json!({
            "tripId": trip_id,
            "currentStatus": current,
            "expectedStatus": transition.expected(),
        })),
    }
}

/// Trip service implementing [`TripLifecycleCommand`].
#[derive(Clone)]
pub struct TripLifecycleService<R> {
    trip_repo: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> TripLifecycleService<R> {
    /// Create a service over the trip repository.
    pub fn new(trip_repo: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { trip_repo, clock }
    }
}

impl<R> TripLifecycleService<R>
where
    R: TripRepository,
{
    async fn transition(
        &self,
        trip_id: TripId,
        transition: TripTransition,
    ) -> Result<TripStatusChange, Error> {
        let at = self.clock.utc();
        let applied = self
            .trip_repo
            .apply_transition(&trip_id, &transition, at)
            .await
            .map_err(map_repository_error)?;

        if let Some(change) = applied {
            info!(
                trip_id = %trip_id,
                transition = transition.name(),
                status = %change.status,
                "trip transitioned"
            );
            return Ok(change);
        }

        let current = self
            .trip_repo
            .find_status(&trip_id)
            .await
            .map_err(map_repository_error)?;
        Err(refused(trip_id, &transition, current))
    }
}

#[async_trait]
impl<R> TripLifecycleCommand for TripLifecycleService<R>
where
    R: TripRepository,
{
    async fn request_trip(&self, request: RequestTripRequest) -> Result<Trip, Error> {
        let trip = Trip::request(
            TripId::random(),
            request.rider_id,
            request.origin,
            request.destination,
            self.clock.utc(),
        );
        self.trip_repo
            .insert(&trip)
            .await
            .map_err(map_repository_error)?;

        info!(trip_id = %trip.id(), rider_id = %trip.rider_id(), "trip requested");
        Ok(trip)
    }

    async fn accept(&self, trip_id: TripId, driver_id: DriverId) -> Result<TripStatusChange, Error> {
        self.transition(trip_id, TripTransition::Accept { driver_id })
            .await
    }

    async fn start(&self, trip_id: TripId) -> Result<TripStatusChange, Error> {
        self.transition(trip_id, TripTransition::Start).await
    }

    async fn end(&self, trip_id: TripId) -> Result<TripStatusChange, Error> {
        self.transition(trip_id, TripTransition::End).await
    }
}

#[cfg(test)]
#[path = "trip_service_tests.rs"]
mod tests;
