//! Driving port for trip creation and lifecycle transitions.

use async_trait::async_trait;

use crate::domain::{DriverId, Error, GeoPoint, RiderId, Trip, TripId, TripStatusChange};

/// Request to create a trip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RequestTripRequest {
    /// Rider asking for the trip.
    pub rider_id: RiderId,
    /// Pick-up point.
    pub origin: GeoPoint,
    /// Drop-off point.
    pub destination: GeoPoint,
}

/// Driving port for trip mutations.
///
/// Every transition fails with `not_found` when the trip does not exist and
/// with `conflict` when it is not in the expected predecessor state.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TripLifecycleCommand: Send + Sync {
    /// Create a trip in the `requested` state.
    async fn request_trip(&self, request: RequestTripRequest) -> Result<Trip, Error>;

    /// Assign `driver_id` to a `requested` trip.
    async fn accept(&self, trip_id: TripId, driver_id: DriverId) -> Result<TripStatusChange, Error>;

    /// Move an `accepted` trip to `started`.
    async fn start(&self, trip_id: TripId) -> Result<TripStatusChange, Error>;

    /// Move a `started` trip to `completed`.
    async fn end(&self, trip_id: TripId) -> Result<TripStatusChange, Error>;
}
