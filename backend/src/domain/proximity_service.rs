//! Proximity query domain service.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::TimeDelta;
use mockable::Clock;
use serde_json::json;

use crate::domain::ports::{
    NearbyDriversQuery, NearbyDriversRepository, NearbyDriversRepositoryError,
    NearbyDriversRequest, ProximitySearch,
};
use crate::domain::{Error, GeoPoint, NearbyDriver};

/// Positions older than this are not considered current.
pub const STALENESS_CUTOFF: Duration = Duration::from_secs(15);
/// Radius used when the caller does not supply one.
pub const DEFAULT_RADIUS_M: f64 = 1000.0;
/// Fixed upper bound on returned drivers.
pub const MAX_NEARBY_DRIVERS: usize = 20;

fn map_repository_error(error: NearbyDriversRepositoryError) -> Error {
    match error {
        NearbyDriversRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("location store unavailable: {message}"))
        }
        NearbyDriversRepositoryError::Query { message } => {
            Error::internal(format!("nearby drivers query failed: {message}"))
        }
    }
}

fn invalid_field(field: &str, code: &str, message: String) -> Error {
    Error::invalid_request(message).with_details(json!({ "field": field, "code": code }))
}

fn validate(request: NearbyDriversRequest) -> Result<(GeoPoint, f64), Error> {
    let lat = request
        .lat
        .ok_or_else(|| invalid_field("lat", "missing_field", "lat is required".to_owned()))?;
    let lng = request
        .lng
        .ok_or_else(|| invalid_field("lng", "missing_field", "lng is required".to_owned()))?;
    let center = GeoPoint::new(lat, lng)
        .map_err(|err| invalid_field("lat/lng", "out_of_range", err.to_string()))?;

    let radius_m = request.radius_m.unwrap_or(DEFAULT_RADIUS_M);
    if !radius_m.is_finite() || radius_m <= 0.0 {
        return Err(invalid_field(
            "radius",
            "out_of_range",
            format!("radius must be a positive number of metres, got {radius_m}"),
        ));
    }
    Ok((center, radius_m))
}

/// Proximity service implementing [`NearbyDriversQuery`].
#[derive(Clone)]
pub struct ProximityService<R> {
    nearby_repo: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> ProximityService<R> {
    /// Create a service over the proximity repository.
    pub fn new(nearby_repo: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { nearby_repo, clock }
    }
}

#[async_trait]
impl<R> NearbyDriversQuery for ProximityService<R>
where
    R: NearbyDriversRepository,
{
    async fn nearby(&self, request: NearbyDriversRequest) -> Result<Vec<NearbyDriver>, Error> {
        let (center, radius_m) = validate(request)?;
        let cutoff = TimeDelta::from_std(STALENESS_CUTOFF).unwrap_or(TimeDelta::MAX);
        let search = ProximitySearch {
            center,
            radius_m,
            seen_since: self.clock.utc() - cutoff,
            limit: MAX_NEARBY_DRIVERS,
        };

        self.nearby_repo
            .find_nearby(&search)
            .await
            .map_err(map_repository_error)
    }
}
