//! In-process store implementing every driven storage port.
//!
//! Used when no `DATABASE_URL` is configured and by integration tests. All
//! state lives behind one mutex that is never held across an `.await`, so each
//! port call is a single atomic step: a trip transition checks the expected
//! status and writes the new one under the same lock, which gives the same
//! "exactly one winner" behaviour as the conditional `UPDATE` used against
//! PostgreSQL.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    DriverRepository, DriverRepositoryError, LocationRepository, LocationRepositoryError,
    NearbyDriversRepository, NearbyDriversRepositoryError, ProximitySearch, TripRepository,
    TripRepositoryError,
};
use crate::domain::{
    DriverId, DriverStatus, LocationUpdate, NearbyDriver, Trip, TripId, TripStatus,
    TripStatusChange, TripTransition, UserId,
};

#[derive(Debug, Clone, Copy)]
struct DriverRecord {
    user_id: UserId,
    status: DriverStatus,
}

#[derive(Debug, Default)]
struct State {
    drivers: HashMap<DriverId, DriverRecord>,
    trips: HashMap<TripId, Trip>,
    locations: Vec<LocationUpdate>,
}

impl State {
    fn latest_location(&self, driver_id: &DriverId) -> Option<&LocationUpdate> {
        self.locations
            .iter()
            .filter(|update| update.driver_id() == driver_id)
            .max_by_key(|update| update.recorded_at())
    }

    fn has_active_trip(&self, driver_id: &DriverId) -> bool {
        self.trips.values().any(|trip| {
            trip.driver_id() == Some(driver_id)
                && matches!(trip.status(), TripStatus::Accepted | TripStatus::Started)
        })
    }

    /// Keep the assigned driver's status in step with a trip transition.
    ///
    /// Ending a trip only releases the driver once no other accepted or
    /// started trip still names them.
    fn sync_driver(&mut self, trip: &Trip, transition: &TripTransition) {
        let Some(driver_id) = trip.driver_id().copied() else {
            return;
        };
        let release = matches!(transition, TripTransition::End) && !self.has_active_trip(&driver_id);
        let Some(driver) = self.drivers.get_mut(&driver_id) else {
            return;
        };
        match transition {
            TripTransition::Accept { .. } => driver.status = DriverStatus::Busy,
            TripTransition::End if release && driver.status == DriverStatus::Busy => {
                driver.status = DriverStatus::Available;
            }
            TripTransition::Start | TripTransition::End => {}
        }
    }
}

/// Mutex-guarded in-memory implementation of the storage ports.
///
/// # Examples
/// ```
/// use ride_dispatch::domain::{DriverId, DriverStatus, UserId};
/// use ride_dispatch::outbound::memory::InMemoryStore;
///
/// let store = InMemoryStore::new();
/// let driver = DriverId::random();
/// store.register_driver(driver, UserId::random(), DriverStatus::Available);
/// assert_eq!(store.driver_status(&driver), Some(DriverStatus::Available));
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a driver profile.
    pub fn register_driver(&self, driver_id: DriverId, user_id: UserId, status: DriverStatus) {
        self.lock()
            .drivers
            .insert(driver_id, DriverRecord { user_id, status });
    }

    /// Current status of a driver.
    #[must_use]
    pub fn driver_status(&self, driver_id: &DriverId) -> Option<DriverStatus> {
        self.lock().drivers.get(driver_id).map(|record| record.status)
    }

    /// Snapshot of a stored trip.
    #[must_use]
    pub fn trip(&self, trip_id: &TripId) -> Option<Trip> {
        self.lock().trips.get(trip_id).cloned()
    }

    /// Location history recorded for one driver, oldest append first.
    #[must_use]
    pub fn locations_for(&self, driver_id: &DriverId) -> Vec<LocationUpdate> {
        self.lock()
            .locations
            .iter()
            .filter(|update| update.driver_id() == driver_id)
            .cloned()
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl LocationRepository for InMemoryStore {
    async fn append(&self, update: &LocationUpdate) -> Result<(), LocationRepositoryError> {
        self.lock().locations.push(update.clone());
        Ok(())
    }
}

#[async_trait]
impl NearbyDriversRepository for InMemoryStore {
    async fn find_nearby(
        &self,
        search: &ProximitySearch,
    ) -> Result<Vec<NearbyDriver>, NearbyDriversRepositoryError> {
        let state = self.lock();
        let mut drivers: Vec<NearbyDriver> = state
            .drivers
            .iter()
            .filter(|(_, record)| record.status == DriverStatus::Available)
            .filter_map(|(driver_id, record)| {
                let latest = state.latest_location(driver_id)?;
                if latest.recorded_at() <= search.seen_since {
                    return None;
                }
                let distance_m = search.center.distance_m(&latest.position());
                (distance_m <= search.radius_m).then(|| NearbyDriver {
                    driver_id: *driver_id,
                    user_id: record.user_id,
                    distance_m,
                    position: latest.position(),
                })
            })
            .collect();
        drop(state);

        drivers.sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m));
        drivers.truncate(search.limit);
        Ok(drivers)
    }
}

#[async_trait]
impl TripRepository for InMemoryStore {
    async fn insert(&self, trip: &Trip) -> Result<(), TripRepositoryError> {
        let mut state = self.lock();
        if state.trips.contains_key(trip.id()) {
            return Err(TripRepositoryError::query(format!(
                "trip {} already exists",
                trip.id()
            )));
        }
        state.trips.insert(*trip.id(), trip.clone());
        Ok(())
    }

    async fn apply_transition(
        &self,
        trip_id: &TripId,
        transition: &TripTransition,
        at: DateTime<Utc>,
    ) -> Result<Option<TripStatusChange>, TripRepositoryError> {
        let mut state = self.lock();
        let Some(trip) = state.trips.get_mut(trip_id) else {
            return Ok(None);
        };
        if trip.apply(transition, at).is_err() {
            return Ok(None);
        }
        let updated = trip.clone();
        state.sync_driver(&updated, transition);
        Ok(Some(TripStatusChange::from(&updated)))
    }

    async fn find_status(
        &self,
        trip_id: &TripId,
    ) -> Result<Option<TripStatus>, TripRepositoryError> {
        Ok(self.lock().trips.get(trip_id).map(Trip::status))
    }
}

#[async_trait]
impl DriverRepository for InMemoryStore {
    async fn update_availability(
        &self,
        driver_id: &DriverId,
        status: DriverStatus,
    ) -> Result<bool, DriverRepositoryError> {
        let mut state = self.lock();
        match state.drivers.get_mut(driver_id) {
            Some(record) if record.status != DriverStatus::Busy => {
                record.status = status;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn find_status(
        &self,
        driver_id: &DriverId,
    ) -> Result<Option<DriverStatus>, DriverRepositoryError> {
        Ok(self.driver_status(driver_id))
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
