//! Driving port for proximity searches.

use async_trait::async_trait;

use crate::domain::{Error, NearbyDriver};

/// Proximity search as requested by a caller.
///
/// Coordinates are optional here so the domain, not the transport, decides
/// what a missing value means.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NearbyDriversRequest {
    /// Centre latitude; required.
    pub lat: Option<f64>,
    /// Centre longitude; required.
    pub lng: Option<f64>,
    /// Radius in metres; defaults to 1000.
    pub radius_m: Option<f64>,
}

/// Driving port for "available drivers near me".
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NearbyDriversQuery: Send + Sync {
    /// Return at most 20 available, recently seen drivers ordered by
    /// ascending distance.
    async fn nearby(&self, request: NearbyDriversRequest) -> Result<Vec<NearbyDriver>, Error>;
}
