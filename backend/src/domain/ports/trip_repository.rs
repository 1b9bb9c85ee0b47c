//! Port for trip persistence and conditional lifecycle writes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Trip, TripId, TripStatus, TripStatusChange, TripTransition};

use super::define_port_error;

define_port_error! {
    /// Errors raised by trip repository adapters.
    pub enum TripRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "trip repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "trip repository query failed: {message}",
    }
}

/// Port for storing trips and advancing their status.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TripRepository: Send + Sync {
    /// Persist a newly requested trip.
    async fn insert(&self, trip: &Trip) -> Result<(), TripRepositoryError>;

    /// Apply `transition` as a single conditional write keyed on
    /// [`TripTransition::expected`].
    ///
    /// Returns the trip's new status, or `None` when no trip with that id holds
    /// the expected status. Adapters must never read-then-write here: of two
    /// concurrent calls for the same trip at most one may return `Some`.
    async fn apply_transition(
        &self,
        trip_id: &TripId,
        transition: &TripTransition,
        at: DateTime<Utc>,
    ) -> Result<Option<TripStatusChange>, TripRepositoryError>;

    /// Read the current status of a trip, if it exists.
    async fn find_status(&self, trip_id: &TripId)
    -> Result<Option<TripStatus>, TripRepositoryError>;
}
