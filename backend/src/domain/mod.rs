//! Domain primitives, aggregates, and services.
//!
//! Purpose: Define the strongly typed entities of the dispatch core and the
//! services that implement its driving ports. Nothing here knows about HTTP,
//! WebSockets, SQL, or Redis; adapters reach the domain through [`ports`].
//!
//! Public surface:
//! - Error (alias to `error::Error`): transport-agnostic error payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - TraceId: request-scoped correlation identifier.
//! - Trip, TripStatus, TripTransition: trip lifecycle state machine.
//! - LocationUpdate, GeoPoint: validated driver positions.
//! - RateGuard: fixed-window admission counter.

pub mod driver;
pub mod error;
pub mod geo;
pub mod ids;
pub mod location;
pub mod ports;
pub mod rate_guard;
pub mod trace_id;
pub mod trip;

mod driver_availability_service;
mod ingestion_service;
mod proximity_service;
mod trip_service;

pub use self::driver::{DriverStatus, NearbyDriver, ParseDriverStatusError};
pub use self::driver_availability_service::DriverAvailabilityService;
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::geo::{GeoPoint, GeoValidationError};
pub use self::ids::{DriverId, IdValidationError, RiderId, TripId, UserId};
pub use self::ingestion_service::{
    DEFAULT_BROADCAST_TIMEOUT, DEFAULT_MAX_IN_FLIGHT, DEFAULT_PERSIST_TIMEOUT, IngestionConfig,
    LocationIngestionService,
};
pub use self::location::{LocationReport, LocationUpdate, LocationValidationError};
pub use self::proximity_service::{
    DEFAULT_RADIUS_M, MAX_NEARBY_DRIVERS, ProximityService, STALENESS_CUTOFF,
};
pub use self::rate_guard::{DEFAULT_RATE_LIMIT, DEFAULT_RATE_WINDOW, RateGuard, RateGuardConfig};
pub use self::trace_id::TraceId;
pub use self::trip::{
    ParseTripStatusError, TransitionRejected, Trip, TripStatus, TripStatusChange, TripTransition,
};
pub use self::trip_service::TripLifecycleService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use ride_dispatch::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::conflict("trip already accepted"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
