//! Port for proximity reads over recent driver positions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{GeoPoint, NearbyDriver};

use super::define_port_error;

define_port_error! {
    /// Errors raised by proximity query adapters.
    pub enum NearbyDriversRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "nearby drivers repository connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } =>
            "nearby drivers repository query failed: {message}",
    }
}

/// Parameters of one proximity search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximitySearch {
    /// Query centre.
    pub center: GeoPoint,
    /// Search radius in metres.
    pub radius_m: f64,
    /// Only positions recorded after this instant count as current.
    pub seen_since: DateTime<Utc>,
    /// Maximum number of drivers to return.
    pub limit: usize,
}

/// Port for finding available drivers near a point.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NearbyDriversRepository: Send + Sync {
    /// Return available drivers whose latest position is newer than
    /// `search.seen_since` and within `search.radius_m` of the centre,
    /// nearest first and at most `search.limit` entries.
    ///
    /// Rows that fail to decode are skipped rather than failing the search.
    async fn find_nearby(
        &self,
        search: &ProximitySearch,
    ) -> Result<Vec<NearbyDriver>, NearbyDriversRepositoryError>;
}
