//! Trip lifecycle HTTP handlers.
//!
//! ```text
//! POST  /api/trips
//! PATCH /api/trips/{id}/accept
//! PATCH /api/trips/{id}/start
//! PATCH /api/trips/{id}/end
//! ```

use actix_web::{HttpResponse, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Trip, TripStatusChange};
use crate::domain::ports::RequestTripRequest;
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, TripStatusSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_driver_id, parse_point, parse_rider_id, parse_trip_id,
};

/// Request payload for a new trip.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateTripRequestBody {
    #[schema(format = "uuid")]
    pub rider_id: String,
    pub origin_lat: f64,
    pub origin_lng: f64,
    pub dest_lat: f64,
    pub dest_lng: f64,
}

/// Request payload for claiming a trip.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AcceptTripRequestBody {
    #[schema(format = "uuid")]
    pub driver_id: String,
}

/// Trip identifier and its status after the operation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TripStatusResponseBody {
    #[schema(format = "uuid")]
    pub trip_id: String,
    #[schema(value_type = TripStatusSchema)]
    pub status: String,
}

impl From<&Trip> for TripStatusResponseBody {
    fn from(trip: &Trip) -> Self {
        Self {
            trip_id: trip.id().to_string(),
            status: trip.status().to_string(),
        }
    }
}

impl From<TripStatusChange> for TripStatusResponseBody {
    fn from(change: TripStatusChange) -> Self {
        Self {
            trip_id: change.trip_id.to_string(),
            status: change.status.to_string(),
        }
    }
}

fn parse_create_request(payload: CreateTripRequestBody) -> ApiResult<RequestTripRequest> {
    Ok(RequestTripRequest {
        rider_id: parse_rider_id(&payload.rider_id)?,
        origin: parse_point(
            (FieldName::new("origin_lat"), payload.origin_lat),
            (FieldName::new("origin_lng"), payload.origin_lng),
        )?,
        destination: parse_point(
            (FieldName::new("dest_lat"), payload.dest_lat),
            (FieldName::new("dest_lng"), payload.dest_lng),
        )?,
    })
}

/// Request a trip. Creation never checks driver availability.
#[utoipa::path(
    post,
    path = "/api/trips",
    request_body = CreateTripRequestBody,
    responses(
        (status = 201, description = "Trip requested", body = TripStatusResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 503, description = "Trip store unavailable", body = ErrorSchema)
    ),
    tags = ["trips"],
    operation_id = "createTrip"
)]
#[post("/trips")]
pub async fn create_trip(
    state: web::Data<HttpState>,
    payload: web::Json<CreateTripRequestBody>,
) -> ApiResult<HttpResponse> {
    let request = parse_create_request(payload.into_inner())?;
    let trip = state.trips.request_trip(request).await?;
    Ok(HttpResponse::Created().json(TripStatusResponseBody::from(&trip)))
}

/// Assign a driver to a requested trip. Exactly one concurrent caller wins.
#[utoipa::path(
    patch,
    path = "/api/trips/{id}/accept",
    params(("id" = String, Path, description = "Trip identifier")),
    request_body = AcceptTripRequestBody,
    responses(
        (status = 200, description = "Trip accepted", body = TripStatusResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Trip not found", body = ErrorSchema),
        (status = 409, description = "Trip is not requested", body = ErrorSchema),
        (status = 503, description = "Trip store unavailable", body = ErrorSchema)
    ),
    tags = ["trips"],
    operation_id = "acceptTrip"
)]
#[patch("/trips/{id}/accept")]
pub async fn accept_trip(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<AcceptTripRequestBody>,
) -> ApiResult<web::Json<TripStatusResponseBody>> {
    let trip_id = parse_trip_id(&path.into_inner())?;
    let driver_id = parse_driver_id(&payload.driver_id, FieldName::new("driver_id"))?;
    let change = state.trips.accept(trip_id, driver_id).await?;
    Ok(web::Json(TripStatusResponseBody::from(change)))
}

/// Begin an accepted trip.
#[utoipa::path(
    patch,
    path = "/api/trips/{id}/start",
    params(("id" = String, Path, description = "Trip identifier")),
    responses(
        (status = 200, description = "Trip started", body = TripStatusResponseBody),
        (status = 404, description = "Trip not found", body = ErrorSchema),
        (status = 409, description = "Trip is not accepted", body = ErrorSchema),
        (status = 503, description = "Trip store unavailable", body = ErrorSchema)
    ),
    tags = ["trips"],
    operation_id = "startTrip"
)]
#[patch("/trips/{id}/start")]
pub async fn start_trip(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<TripStatusResponseBody>> {
    let trip_id = parse_trip_id(&path.into_inner())?;
    let change = state.trips.start(trip_id).await?;
    Ok(web::Json(TripStatusResponseBody::from(change)))
}

/// Finish a started trip.
#[utoipa::path(
    patch,
    path = "/api/trips/{id}/end",
    params(("id" = String, Path, description = "Trip identifier")),
    responses(
        (status = 200, description = "Trip completed", body = TripStatusResponseBody),
        (status = 404, description = "Trip not found", body = ErrorSchema),
        (status = 409, description = "Trip is not started", body = ErrorSchema),
        (status = 503, description = "Trip store unavailable", body = ErrorSchema)
    ),
    tags = ["trips"],
    operation_id = "endTrip"
)]
#[patch("/trips/{id}/end")]
pub async fn end_trip(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<TripStatusResponseBody>> {
    let trip_id = parse_trip_id(&path.into_inner())?;
    let change = state.trips.end(trip_id).await?;
    Ok(web::Json(TripStatusResponseBody::from(change)))
}

#[cfg(test)]
#[path = "trips_tests.rs"]
mod tests;
