//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The resource is not in the state the operation expects.
    #[schema(rename = "conflict")]
    Conflict,
    /// Too many requests from this client in the current window.
    #[schema(rename = "rate_limited")]
    RateLimited,
    /// A downstream store is unreachable or timed out.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "conflict")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "trip is not in the expected state")]
    message: String,
    /// Correlation identifier for tracing this error across systems.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Supplementary error details for clients.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::TripStatus`].
#[derive(ToSchema)]
#[schema(as = crate::domain::TripStatus)]
pub enum TripStatusSchema {
    /// Waiting for a driver.
    #[schema(rename = "requested")]
    Requested,
    /// A driver has claimed the trip.
    #[schema(rename = "accepted")]
    Accepted,
    /// The rider is on board.
    #[schema(rename = "started")]
    Started,
    /// The trip has finished.
    #[schema(rename = "completed")]
    Completed,
}

/// OpenAPI schema for [`crate::domain::DriverStatus`].
#[derive(ToSchema)]
#[schema(as = crate::domain::DriverStatus)]
pub enum DriverStatusSchema {
    /// Not accepting trips.
    #[schema(rename = "offline")]
    Offline,
    /// Visible to proximity queries.
    #[schema(rename = "available")]
    Available,
    /// Assigned to an active trip.
    #[schema(rename = "busy")]
    Busy,
}
