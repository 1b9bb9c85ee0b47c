//! Geographic points and great-circle distance.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in metres used for haversine distances.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Validation errors for coordinates.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum GeoValidationError {
    /// Latitude was non-finite or outside `[-90, 90]`.
    #[error("latitude must be a finite number between -90 and 90, got {0}")]
    Latitude(f64),
    /// Longitude was non-finite or outside `[-180, 180]`.
    #[error("longitude must be a finite number between -180 and 180, got {0}")]
    Longitude(f64),
}

/// WGS84 coordinate pair.
///
/// ## Invariants
/// - `lat` is finite and within `[-90, 90]`.
/// - `lng` is finite and within `[-180, 180]`.
///
/// # Examples
/// ```
/// use ride_dispatch::domain::GeoPoint;
///
/// let origin = GeoPoint::new(0.0, 0.0).expect("valid point");
/// let north = GeoPoint::new(0.001, 0.0).expect("valid point");
/// assert!((origin.distance_m(&north) - 111.19).abs() < 0.1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPoint", into = "RawPoint")]
pub struct GeoPoint {
    lat: f64,
    lng: f64,
}

impl GeoPoint {
    /// Validate and construct a point.
    pub fn new(lat: f64, lng: f64) -> Result<Self, GeoValidationError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(GeoValidationError::Latitude(lat));
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(GeoValidationError::Longitude(lng));
        }
        Ok(Self { lat, lng })
    }

    /// Latitude in decimal degrees.
    #[must_use]
    pub const fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in decimal degrees.
    #[must_use]
    pub const fn lng(&self) -> f64 {
        self.lng
    }

    /// Haversine distance to `other` in metres.
    #[must_use]
    pub fn distance_m(&self, other: &Self) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let dlat = (other.lat - self.lat).to_radians();
        let dlng = (other.lng - self.lng).to_radians();
        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_M * c
    }
}

#[derive(Serialize, Deserialize)]
struct RawPoint {
    lat: f64,
    lng: f64,
}

impl From<GeoPoint> for RawPoint {
    fn from(value: GeoPoint) -> Self {
        Self {
            lat: value.lat,
            lng: value.lng,
        }
    }
}

impl TryFrom<RawPoint> for GeoPoint {
    type Error = GeoValidationError;

    fn try_from(value: RawPoint) -> Result<Self, Self::Error> {
        Self::new(value.lat, value.lng)
    }
}
