//! Driver HTTP handlers: proximity search and availability.
//!
//! ```text
//! GET   /api/drivers/nearby?lat=&lng=&radius=
//! PATCH /api/drivers/{id}/status
//! ```

use actix_web::{get, patch, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::NearbyDriversRequest;
use crate::domain::{DriverStatus, Error, NearbyDriver};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{DriverStatusSchema, ErrorSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_driver_id};

/// Query string for the proximity search.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NearbyDriversParams {
    /// Latitude of the search centre in degrees.
    pub lat: Option<f64>,
    /// Longitude of the search centre in degrees.
    pub lng: Option<f64>,
    /// Search radius in metres; defaults to 1000.
    pub radius: Option<f64>,
}

/// One candidate driver.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NearbyDriverBody {
    #[schema(format = "uuid")]
    pub driver_id: String,
    #[schema(format = "uuid")]
    pub user_id: String,
    pub distance_m: f64,
    pub lat: f64,
    pub lng: f64,
}

impl From<NearbyDriver> for NearbyDriverBody {
    fn from(driver: NearbyDriver) -> Self {
        Self {
            driver_id: driver.driver_id.to_string(),
            user_id: driver.user_id.to_string(),
            distance_m: driver.distance_m,
            lat: driver.position.lat(),
            lng: driver.position.lng(),
        }
    }
}

/// Proximity search result.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NearbyDriversResponseBody {
    pub drivers: Vec<NearbyDriverBody>,
    pub count: usize,
}

/// Requested availability change.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct DriverStatusRequestBody {
    #[schema(value_type = DriverStatusSchema)]
    pub status: String,
}

/// Driver status after the change.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DriverStatusResponseBody {
    #[schema(format = "uuid")]
    pub driver_id: String,
    #[schema(value_type = DriverStatusSchema)]
    pub status: String,
}

/// Available drivers seen in the last 15 seconds, nearest first, at most 20.
#[utoipa::path(
    get,
    path = "/api/drivers/nearby",
    params(NearbyDriversParams),
    responses(
        (status = 200, description = "Nearby drivers", body = NearbyDriversResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 503, description = "Location store unavailable", body = ErrorSchema)
    ),
    tags = ["drivers"],
    operation_id = "nearbyDrivers"
)]
#[get("/drivers/nearby")]
pub async fn nearby_drivers(
    state: web::Data<HttpState>,
    params: web::Query<NearbyDriversParams>,
) -> ApiResult<web::Json<NearbyDriversResponseBody>> {
    let NearbyDriversParams { lat, lng, radius } = params.into_inner();
    let drivers = state
        .nearby
        .nearby(NearbyDriversRequest {
            lat,
            lng,
            radius_m: radius,
        })
        .await?;

    let drivers: Vec<NearbyDriverBody> = drivers.into_iter().map(NearbyDriverBody::from).collect();
    Ok(web::Json(NearbyDriversResponseBody {
        count: drivers.len(),
        drivers,
    }))
}

/// Toggle a driver between `available` and `offline`.
#[utoipa::path(
    patch,
    path = "/api/drivers/{id}/status",
    params(("id" = String, Path, description = "Driver identifier")),
    request_body = DriverStatusRequestBody,
    responses(
        (status = 200, description = "Status updated", body = DriverStatusResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Driver not found", body = ErrorSchema),
        (status = 409, description = "Driver is on a trip", body = ErrorSchema),
        (status = 503, description = "Driver store unavailable", body = ErrorSchema)
    ),
    tags = ["drivers"],
    operation_id = "setDriverStatus"
)]
#[patch("/drivers/{id}/status")]
pub async fn set_driver_status(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<DriverStatusRequestBody>,
) -> ApiResult<web::Json<DriverStatusResponseBody>> {
    let driver_id = parse_driver_id(&path.into_inner(), FieldName::new("driver_id"))?;
    let raw = payload.into_inner().status;
    let requested: DriverStatus = raw.parse().map_err(|_| {
        Error::invalid_request("status must be available or offline").with_details(json!({
            "field": "status",
            "value": raw,
            "code": "invalid_status",
        }))
    })?;

    let status = state.availability.set_status(driver_id, requested).await?;
    Ok(web::Json(DriverStatusResponseBody {
        driver_id: driver_id.to_string(),
        status: status.to_string(),
    }))
}

#[cfg(test)]
#[path = "drivers_tests.rs"]
mod tests;
