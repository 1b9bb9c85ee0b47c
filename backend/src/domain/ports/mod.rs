//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports are called by inbound adapters (HTTP, WebSocket); driven
//! ports are implemented by outbound adapters (PostgreSQL, Redis, memory).

mod macros;
pub(crate) use macros::define_port_error;

mod driver_availability_command;
mod driver_repository;
mod location_broadcaster;
mod location_ingestion;
mod location_repository;
mod nearby_drivers_query;
mod nearby_drivers_repository;
mod trip_lifecycle_command;
mod trip_repository;

pub use driver_availability_command::DriverAvailabilityCommand;
#[cfg(test)]
pub use driver_availability_command::MockDriverAvailabilityCommand;
#[cfg(test)]
pub use driver_repository::MockDriverRepository;
pub use driver_repository::{DriverRepository, DriverRepositoryError};
#[cfg(test)]
pub use location_broadcaster::MockLocationBroadcaster;
pub use location_broadcaster::{LocationBroadcastError, LocationBroadcaster};
#[cfg(test)]
pub use location_ingestion::MockLocationIngestion;
pub use location_ingestion::{IngestReceipt, LocationIngestion};
#[cfg(test)]
pub use location_repository::MockLocationRepository;
pub use location_repository::{LocationRepository, LocationRepositoryError};
#[cfg(test)]
pub use nearby_drivers_query::MockNearbyDriversQuery;
pub use nearby_drivers_query::{NearbyDriversQuery, NearbyDriversRequest};
#[cfg(test)]
pub use nearby_drivers_repository::MockNearbyDriversRepository;
pub use nearby_drivers_repository::{
    NearbyDriversRepository, NearbyDriversRepositoryError, ProximitySearch,
};
#[cfg(test)]
pub use trip_lifecycle_command::MockTripLifecycleCommand;
pub use trip_lifecycle_command::{RequestTripRequest, TripLifecycleCommand};
#[cfg(test)]
pub use trip_repository::MockTripRepository;
pub use trip_repository::{TripRepository, TripRepositoryError};
