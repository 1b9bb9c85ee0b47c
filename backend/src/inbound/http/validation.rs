//! Shared validation helpers for inbound HTTP adapters.

use actix_web::HttpRequest;
use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use serde_json::json;

use crate::domain::{DriverId, Error, GeoPoint, GeoValidationError, IdValidationError, RiderId, TripId};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    OutOfRange,
    MalformedBody,
    MalformedQuery,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::OutOfRange => "out_of_range",
            ErrorCode::MalformedBody => "malformed_body",
            ErrorCode::MalformedQuery => "malformed_query",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: String,
    message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("missing required field: {field}"))
        .with_code(ErrorCode::MissingField)
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} must be a valid UUID"))
        .with_value(ErrorCode::InvalidUuid, value)
}

fn parse_id<T>(
    value: &str,
    field: FieldName,
    parse: impl FnOnce(&str) -> Result<T, IdValidationError>,
) -> Result<T, Error> {
    parse(value).map_err(|err| match err {
        IdValidationError::Empty => missing_field_error(field),
        IdValidationError::Invalid => invalid_uuid_error(field, value),
    })
}

pub(crate) fn parse_trip_id(value: &str) -> Result<TripId, Error> {
    parse_id(value, FieldName::new("trip_id"), |raw| TripId::new(raw))
}

pub(crate) fn parse_driver_id(value: &str, field: FieldName) -> Result<DriverId, Error> {
    parse_id(value, field, |raw| DriverId::new(raw))
}

pub(crate) fn parse_rider_id(value: &str) -> Result<RiderId, Error> {
    parse_id(value, FieldName::new("rider_id"), |raw| RiderId::new(raw))
}

/// Validate a coordinate pair supplied as two separate fields.
pub(crate) fn parse_point(
    lat: (FieldName, f64),
    lng: (FieldName, f64),
) -> Result<GeoPoint, Error> {
    let (lat_field, lat_value) = lat;
    let (lng_field, lng_value) = lng;
    GeoPoint::new(lat_value, lng_value).map_err(|err| {
        let field = match err {
            GeoValidationError::Latitude(_) => lat_field,
            GeoValidationError::Longitude(_) => lng_field,
        };
        ValidationError::new(field.as_str(), err.to_string()).with_code(ErrorCode::OutOfRange)
    })
}

/// Map JSON extractor failures to the domain error envelope.
pub(crate) fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request(format!("invalid JSON body: {err}"))
        .with_details(json!({ "code": ErrorCode::MalformedBody.as_str() }))
        .into()
}

/// Map query-string extractor failures to the domain error envelope.
pub(crate) fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request(format!("invalid query string: {err}"))
        .with_details(json!({ "code": ErrorCode::MalformedQuery.as_str() }))
        .into()
}

/// Map path extractor failures to the domain error envelope.
pub(crate) fn path_error_handler(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request(format!("invalid path: {err}")).into()
}
