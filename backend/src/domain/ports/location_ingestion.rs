//! Driving port for streamed driver positions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Error, LocationReport};

/// Outcome of accepting one streamed frame.
///
/// Acceptance means "received": broadcast and persistence run afterwards and
/// their failures never surface here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestReceipt {
    /// Server time the frame was accepted.
    pub received_at: DateTime<Utc>,
}

/// Driving port used by streaming sessions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LocationIngestion: Send + Sync {
    /// Validate `report` and dispatch its side effects.
    ///
    /// `payload` is the frame exactly as received and is what subscribers of
    /// the broadcast topic see. Returns `invalid_request` when the report
    /// fails validation; the caller decides whether that ends the stream.
    async fn ingest(&self, report: LocationReport, payload: String)
    -> Result<IngestReceipt, Error>;
}
