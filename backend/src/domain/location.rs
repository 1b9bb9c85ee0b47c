//! Location updates streamed by drivers.

use chrono::{DateTime, Utc};

use super::geo::{GeoPoint, GeoValidationError};
use super::ids::{DriverId, IdValidationError};

/// Unvalidated position report as decoded from a driver's stream.
///
/// `ts_ms` is the client timestamp in milliseconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationReport {
    /// Reporting driver, expected to be a UUID.
    pub driver_id: String,
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lng: f64,
    /// Client timestamp; absent or non-positive values are replaced by the
    /// server receive time.
    pub ts_ms: Option<i64>,
    /// Ground speed as reported by the client.
    pub speed: Option<f64>,
    /// Compass heading as reported by the client.
    pub heading: Option<f64>,
}

/// Reasons a [`LocationReport`] cannot become a [`LocationUpdate`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LocationValidationError {
    /// The driver identifier is not a UUID.
    #[error("driver_id: {0}")]
    DriverId(#[from] IdValidationError),
    /// Coordinates are out of range.
    #[error(transparent)]
    Position(#[from] GeoValidationError),
    /// The timestamp cannot be represented.
    #[error("ts {0} is outside the representable range")]
    Timestamp(i64),
    /// Speed or heading is not a finite number.
    #[error("{0} must be a finite number")]
    NonFinite(&'static str),
}

/// A validated position sample.
///
/// Updates are append-only: nothing in this crate mutates or deletes one once
/// it has been handed to the broadcast bus or the location history.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationUpdate {
    driver_id: DriverId,
    position: GeoPoint,
    recorded_at: DateTime<Utc>,
    speed: Option<f64>,
    heading: Option<f64>,
}

impl LocationUpdate {
    /// Validate a report, stamping it with `received_at` when the client sent
    /// no usable timestamp.
    pub fn from_report(
        report: LocationReport,
        received_at: DateTime<Utc>,
    ) -> Result<Self, LocationValidationError> {
        let driver_id = DriverId::new(&report.driver_id)?;
        let position = GeoPoint::new(report.lat, report.lng)?;
        let recorded_at = match report.ts_ms {
            Some(ms) if ms > 0 => DateTime::from_timestamp_millis(ms)
                .ok_or(LocationValidationError::Timestamp(ms))?,
            _ => received_at,
        };
        if report.speed.is_some_and(|v| !v.is_finite()) {
            return Err(LocationValidationError::NonFinite("speed"));
        }
        if report.heading.is_some_and(|v| !v.is_finite()) {
            return Err(LocationValidationError::NonFinite("heading"));
        }
        Ok(Self {
            driver_id,
            position,
            recorded_at,
            speed: report.speed,
            heading: report.heading,
        })
    }

    /// Driver that produced the sample.
    #[must_use]
    pub const fn driver_id(&self) -> &DriverId {
        &self.driver_id
    }

    /// Reported position.
    #[must_use]
    pub const fn position(&self) -> GeoPoint {
        self.position
    }

    /// Event time of the sample.
    #[must_use]
    pub const fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    /// Reported speed, if any.
    #[must_use]
    pub const fn speed(&self) -> Option<f64> {
        self.speed
    }

    /// Reported heading, if any.
    #[must_use]
    pub const fn heading(&self) -> Option<f64> {
        self.heading
    }
}
