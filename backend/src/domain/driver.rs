//! Driver availability and proximity results.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::geo::GeoPoint;
use super::ids::{DriverId, UserId};

/// Availability of a driver for new trips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverStatus {
    /// Not taking trips.
    Offline,
    /// Visible to proximity search.
    Available,
    /// Assigned to an active trip.
    Busy,
}

impl DriverStatus {
    /// Stable lowercase representation used in storage and on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Offline => "offline",
            Self::Available => "available",
            Self::Busy => "busy",
        }
    }
}

/// Error returned when parsing an unknown [`DriverStatus`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDriverStatusError(String);

impl fmt::Display for DriverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ParseDriverStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid driver status: {}", self.0)
    }
}

impl std::error::Error for ParseDriverStatusError {}

impl FromStr for DriverStatus {
    type Err = ParseDriverStatusError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "offline" => Ok(Self::Offline),
            "available" => Ok(Self::Available),
            "busy" => Ok(Self::Busy),
            other => Err(ParseDriverStatusError(other.to_owned())),
        }
    }
}

/// A driver returned by a proximity search.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyDriver {
    /// Driver profile.
    pub driver_id: DriverId,
    /// Owning user account.
    pub user_id: UserId,
    /// Geodesic distance from the query centre, computed at query time.
    pub distance_m: f64,
    /// Most recent reported position.
    pub position: GeoPoint,
}
