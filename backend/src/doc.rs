//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the dispatch API. It registers:
//!
//! - **Paths**: the trip lifecycle, driver, health, and location stream
//!   endpoints from the inbound layer
//! - **Schemas**: domain type wrappers ([`ErrorSchema`], [`ErrorCodeSchema`],
//!   [`TripStatusSchema`], [`DriverStatusSchema`]) plus the request and
//!   response bodies, including the frames exchanged on `/ws`
//!
//! The generated specification is served by Swagger UI in debug builds and
//! printed by the `openapi-dump` binary.

use crate::inbound::http::drivers::{
    DriverStatusRequestBody, DriverStatusResponseBody, NearbyDriverBody, NearbyDriversResponseBody,
};
use crate::inbound::http::health::HealthStatusResponse;
use crate::inbound::http::schemas::{
    DriverStatusSchema, ErrorCodeSchema, ErrorSchema, TripStatusSchema,
};
use crate::inbound::http::trips::{
    AcceptTripRequestBody, CreateTripRequestBody, TripStatusResponseBody,
};
use crate::inbound::ws::messages::{AckFrame, LocationFrame};
use utoipa::OpenApi;

/// OpenAPI document for the dispatch API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Ride dispatch API",
        description = "Trip lifecycle, driver proximity search, and the driver location stream."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::trips::create_trip,
        crate::inbound::http::trips::accept_trip,
        crate::inbound::http::trips::start_trip,
        crate::inbound::http::trips::end_trip,
        crate::inbound::http::drivers::nearby_drivers,
        crate::inbound::http::drivers::set_driver_status,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
        crate::inbound::http::health::health,
        crate::inbound::ws::ws_entry,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        TripStatusSchema,
        DriverStatusSchema,
        CreateTripRequestBody,
        AcceptTripRequestBody,
        TripStatusResponseBody,
        NearbyDriverBody,
        NearbyDriversResponseBody,
        DriverStatusRequestBody,
        DriverStatusResponseBody,
        HealthStatusResponse,
        LocationFrame,
        AckFrame,
    )),
    tags(
        (name = "trips", description = "Trip lifecycle transitions"),
        (name = "drivers", description = "Driver proximity search and availability"),
        (name = "locations", description = "Driver location stream"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the generated OpenAPI document.

    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    // Note: utoipa replaces :: with . in schema names
    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";

    /// Assert that an Object schema contains a field with the given name.
    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn openapi_error_schema_has_required_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get(ERROR_SCHEMA_NAME).expect("Error schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "message");
        assert_object_schema_has_field(error_schema, "traceId");
    }

    #[rstest]
    #[case("/api/trips")]
    #[case("/api/trips/{id}/accept")]
    #[case("/api/trips/{id}/start")]
    #[case("/api/trips/{id}/end")]
    #[case("/api/drivers/nearby")]
    #[case("/api/drivers/{id}/status")]
    #[case("/health")]
    #[case("/health/ready")]
    #[case("/health/live")]
    #[case("/ws")]
    fn openapi_registers_path(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(
            doc.paths.paths.contains_key(path),
            "path '{path}' should be documented"
        );
    }

    #[test]
    fn openapi_frame_schemas_describe_the_stream() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;

        let frame = schemas.get("LocationFrame").expect("LocationFrame schema");
        assert_object_schema_has_field(frame, "driver_id");
        assert_object_schema_has_field(frame, "ts");

        let ack = schemas.get("AckFrame").expect("AckFrame schema");
        assert_object_schema_has_field(ack, "status");
        assert_object_schema_has_field(ack, "ts");
    }
}
