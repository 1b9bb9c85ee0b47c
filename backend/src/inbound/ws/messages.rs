//! Wire-level message definitions for the location stream.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::LocationReport;
use crate::domain::ports::IngestReceipt;

/// Position frame sent by a driver.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LocationFrame {
    #[schema(format = "uuid")]
    pub driver_id: String,
    pub lat: f64,
    pub lng: f64,
    /// Client time in milliseconds since the Unix epoch.
    #[serde(default)]
    pub ts: Option<i64>,
    #[serde(default)]
    pub speed: Option<f64>,
    #[serde(default)]
    pub heading: Option<f64>,
}

impl From<LocationFrame> for LocationReport {
    fn from(frame: LocationFrame) -> Self {
        Self {
            driver_id: frame.driver_id,
            lat: frame.lat,
            lng: frame.lng,
            ts_ms: frame.ts,
            speed: frame.speed,
            heading: frame.heading,
        }
    }
}

/// Acknowledgement returned for every accepted frame.
///
/// An ack means "received", not "durably stored".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AckFrame {
    #[schema(example = "ok")]
    pub status: String,
    /// Server receive time in seconds since the Unix epoch.
    pub ts: i64,
}

impl From<IngestReceipt> for AckFrame {
    fn from(receipt: IngestReceipt) -> Self {
        Self {
            status: "ok".to_owned(),
            ts: receipt.received_at.timestamp(),
        }
    }
}
