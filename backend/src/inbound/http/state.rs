//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{DriverAvailabilityCommand, NearbyDriversQuery, TripLifecycleCommand};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub trips: Arc<dyn TripLifecycleCommand>,
    pub nearby: Arc<dyn NearbyDriversQuery>,
    pub availability: Arc<dyn DriverAvailabilityCommand>,
}

impl HttpState {
    /// Bundle the driving ports served over HTTP.
    pub fn new(
        trips: Arc<dyn TripLifecycleCommand>,
        nearby: Arc<dyn NearbyDriversQuery>,
        availability: Arc<dyn DriverAvailabilityCommand>,
    ) -> Self {
        Self {
            trips,
            nearby,
            availability,
        }
    }
}
