//! Trip entity and its lifecycle state machine.
//!
//! ```text
//! requested --accept(driver)--> accepted --start--> started --end--> completed
//! ```
//!
//! Transitions only ever move forward and each one names the single status it
//! may be applied from. Stores apply them as conditional writes keyed on that
//! expected status, which is what keeps concurrent callers from both winning.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::geo::GeoPoint;
use super::ids::{DriverId, RiderId, TripId};

/// Lifecycle status of a trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripStatus {
    /// Created by a rider, waiting for a driver.
    Requested,
    /// Claimed by a driver.
    Accepted,
    /// Rider picked up.
    Started,
    /// Rider dropped off.
    Completed,
}

impl TripStatus {
    /// Stable lowercase representation used in storage and on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Requested => "requested",
            Self::Accepted => "accepted",
            Self::Started => "started",
            Self::Completed => "completed",
        }
    }
}

/// Error returned when parsing an unknown [`TripStatus`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid trip status: {0}")]
pub struct ParseTripStatusError(String);

impl fmt::Display for TripStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TripStatus {
    type Err = ParseTripStatusError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "requested" => Ok(Self::Requested),
            "accepted" => Ok(Self::Accepted),
            "started" => Ok(Self::Started),
            "completed" => Ok(Self::Completed),
            other => Err(ParseTripStatusError(other.to_owned())),
        }
    }
}

/// A forward move through the trip lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripTransition {
    /// Assign a driver to a requested trip.
    Accept {
        /// Driver claiming the trip.
        driver_id: DriverId,
    },
    /// Begin an accepted trip.
    Start,
    /// Finish a started trip.
    End,
}

impl TripTransition {
    /// Status the trip must currently hold for the transition to apply.
    #[must_use]
    pub const fn expected(&self) -> TripStatus {
        match self {
            Self::Accept { .. } => TripStatus::Requested,
            Self::Start => TripStatus::Accepted,
            Self::End => TripStatus::Started,
        }
    }

    /// Status the trip holds after the transition.
    #[must_use]
    pub const fn target(&self) -> TripStatus {
        match self {
            Self::Accept { .. } => TripStatus::Accepted,
            Self::Start => TripStatus::Started,
            Self::End => TripStatus::Completed,
        }
    }

    /// Verb used in logs and error messages.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Accept { .. } => "accept",
            Self::Start => "start",
            Self::End => "end",
        }
    }
}

/// Raised when a transition is applied to a trip in the wrong status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot {transition} a trip that is {current}, expected {expected}")]
pub struct TransitionRejected {
    /// Verb of the refused transition.
    pub transition: &'static str,
    /// Status the trip holds.
    pub current: TripStatus,
    /// Status the transition requires.
    pub expected: TripStatus,
}

/// Trip identity and status after a lifecycle write was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TripStatusChange {
    /// Trip that moved.
    pub trip_id: TripId,
    /// Driver assigned to the trip, once accepted.
    pub driver_id: Option<DriverId>,
    /// Status the trip now holds.
    pub status: TripStatus,
}

impl From<&Trip> for TripStatusChange {
    fn from(trip: &Trip) -> Self {
        Self {
            trip_id: trip.id,
            driver_id: trip.driver_id,
            status: trip.status,
        }
    }
}

/// A rider-requested journey.
///
/// ## Invariants
/// - `driver_id` is set exactly when the status is past `requested`.
/// - `started_at` is set exactly when the status is `started` or `completed`.
/// - `ended_at` is set exactly when the status is `completed`.
#[derive(Debug, Clone, PartialEq)]
pub struct Trip {
    id: TripId,
    rider_id: RiderId,
    driver_id: Option<DriverId>,
    origin: GeoPoint,
    destination: GeoPoint,
    status: TripStatus,
    created_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
}

impl Trip {
    /// Create a new trip in the `requested` state.
    #[must_use]
    pub fn request(
        id: TripId,
        rider_id: RiderId,
        origin: GeoPoint,
        destination: GeoPoint,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            rider_id,
            driver_id: None,
            origin,
            destination,
            status: TripStatus::Requested,
            created_at,
            started_at: None,
            ended_at: None,
        }
    }

    /// Apply `transition` at time `at`, refusing it unless the trip holds the
    /// expected predecessor status.
    pub fn apply(
        &mut self,
        transition: &TripTransition,
        at: DateTime<Utc>,
    ) -> Result<(), TransitionRejected> {
        if self.status != transition.expected() {
            return Err(TransitionRejected {
                transition: transition.name(),
                current: self.status,
                expected: transition.expected(),
            });
        }
        match transition {
            TripTransition::Accept { driver_id } => self.driver_id = Some(*driver_id),
            TripTransition::Start => self.started_at = Some(at),
            TripTransition::End => self.ended_at = Some(at),
        }
        self.status = transition.target();
        Ok(())
    }

    /// Trip identifier.
    #[must_use]
    pub const fn id(&self) -> &TripId {
        &self.id
    }

    /// Rider who requested the trip.
    #[must_use]
    pub const fn rider_id(&self) -> &RiderId {
        &self.rider_id
    }

    /// Assigned driver, once accepted.
    #[must_use]
    pub const fn driver_id(&self) -> Option<&DriverId> {
        self.driver_id.as_ref()
    }

    /// Pick-up point.
    #[must_use]
    pub const fn origin(&self) -> GeoPoint {
        self.origin
    }

    /// Drop-off point.
    #[must_use]
    pub const fn destination(&self) -> GeoPoint {
        self.destination
    }

    /// Current lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TripStatus {
        self.status
    }

    /// Creation time.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Start time, once started.
    #[must_use]
    pub const fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// End time, once completed.
    #[must_use]
    pub const fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }
}
