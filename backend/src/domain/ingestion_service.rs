//! Location ingestion domain service.
//!
//! Each accepted frame fans out into two detached side effects: a bounded-wait
//! publish to the broadcast bus and a bounded-wait append to the location
//! history. Neither is awaited by the caller and neither can fail the frame;
//! failures and timeouts are logged and dropped.
//!
//! Side effects hold a permit from a shared semaphore while they run. When
//! every permit is taken, `ingest` waits for one to free up, which pushes back
//! on the sending session instead of spawning without bound.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::Clock;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::domain::ports::{
    IngestReceipt, LocationBroadcaster, LocationIngestion, LocationRepository,
};
use crate::domain::{Error, LocationReport, LocationUpdate, TraceId};

/// Default deadline for one broadcast publish.
pub const DEFAULT_BROADCAST_TIMEOUT: Duration = Duration::from_millis(500);
/// Default deadline for one location history append.
pub const DEFAULT_PERSIST_TIMEOUT: Duration = Duration::from_secs(2);
/// Default number of side effects allowed in flight at once.
pub const DEFAULT_MAX_IN_FLIGHT: u32 = 64;

/// Deadlines and concurrency bound for ingestion side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestionConfig {
    broadcast_timeout: Duration,
    persist_timeout: Duration,
    max_in_flight: u32,
}

impl IngestionConfig {
    /// Override the broadcast deadline.
    #[must_use]
    pub const fn with_broadcast_timeout(mut self, value: Duration) -> Self {
        self.broadcast_timeout = value;
        self
    }

    /// Override the persistence deadline.
    #[must_use]
    pub const fn with_persist_timeout(mut self, value: Duration) -> Self {
        self.persist_timeout = value;
        self
    }

    /// Override the in-flight bound. Values below one are raised to one.
    #[must_use]
    pub const fn with_max_in_flight(mut self, value: u32) -> Self {
        self.max_in_flight = if value == 0 { 1 } else { value };
        self
    }

    /// Broadcast deadline.
    #[must_use]
    pub const fn broadcast_timeout(&self) -> Duration {
        self.broadcast_timeout
    }

    /// Persistence deadline.
    #[must_use]
    pub const fn persist_timeout(&self) -> Duration {
        self.persist_timeout
    }

    /// Maximum side effects in flight.
    #[must_use]
    pub const fn max_in_flight(&self) -> u32 {
        self.max_in_flight
    }
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            broadcast_timeout: DEFAULT_BROADCAST_TIMEOUT,
            persist_timeout: DEFAULT_PERSIST_TIMEOUT,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }
}

/// Ingestion service implementing [`LocationIngestion`].
#[derive(Clone)]
pub struct LocationIngestionService {
    broadcaster: Arc<dyn LocationBroadcaster>,
    locations: Arc<dyn LocationRepository>,
    clock: Arc<dyn Clock>,
    side_effects: Arc<Semaphore>,
    config: IngestionConfig,
}

impl LocationIngestionService {
    /// Create a service publishing to `broadcaster` and appending to
    /// `locations`.
    pub fn new(
        broadcaster: Arc<dyn LocationBroadcaster>,
        locations: Arc<dyn LocationRepository>,
        clock: Arc<dyn Clock>,
        config: IngestionConfig,
    ) -> Self {
        Self {
            broadcaster,
            locations,
            clock,
            side_effects: Arc::new(Semaphore::new(config.max_in_flight() as usize)),
            config,
        }
    }

    /// Wait until every in-flight side effect has finished.
    ///
    /// Used on shutdown so pending appends are not cut off.
    pub async fn drain(&self) {
        if let Ok(permits) = self
            .side_effects
            .acquire_many(self.config.max_in_flight())
            .await
        {
            drop(permits);
        }
    }

    async fn dispatch<F>(&self, effect: F) -> Result<(), Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let permit = self
            .side_effects
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| Error::service_unavailable("location ingestion is shutting down"))?;
        tokio::spawn(TraceId::propagate(async move {
            effect.await;
            drop(permit);
        }));
        Ok(())
    }
}

async fn broadcast(
    broadcaster: Arc<dyn LocationBroadcaster>,
    payload: Arc<str>,
    update: Arc<LocationUpdate>,
    deadline: Duration,
) {
    match timeout(deadline, broadcaster.publish(&payload)).await {
        Ok(Ok(())) => debug!(driver_id = %update.driver_id(), "location broadcast"),
        Ok(Err(error)) => warn!(%error, driver_id = %update.driver_id(), "location broadcast failed"),
        Err(_) => warn!(
            driver_id = %update.driver_id(),
            timeout_ms = deadline.as_millis(),
            "location broadcast timed out"
        ),
    }
}

async fn persist(
    locations: Arc<dyn LocationRepository>,
    update: Arc<LocationUpdate>,
    deadline: Duration,
) {
    match timeout(deadline, locations.append(&update)).await {
        Ok(Ok(())) => debug!(driver_id = %update.driver_id(), "location persisted"),
        Ok(Err(err)) => error!(error = %err, driver_id = %update.driver_id(), "location persist failed"),
        Err(_) => error!(
            driver_id = %update.driver_id(),
            timeout_ms = deadline.as_millis(),
            "location persist timed out"
        ),
    }
}

#[async_trait]
impl LocationIngestion for LocationIngestionService {
    async fn ingest(
        &self,
        report: LocationReport,
        payload: String,
    ) -> Result<IngestReceipt, Error> {
        let received_at = self.clock.utc();
        let update = LocationUpdate::from_report(report, received_at)
            .map_err(|err| Error::invalid_request(format!("invalid location update: {err}")))?;
        info!(
            driver_id = %update.driver_id(),
            lat = update.position().lat(),
            lng = update.position().lng(),
            "location received"
        );

        let update = Arc::new(update);
        let payload: Arc<str> = Arc::from(payload);
        self.dispatch(broadcast(
            self.broadcaster.clone(),
            payload,
            update.clone(),
            self.config.broadcast_timeout(),
        ))
        .await?;
        self.dispatch(persist(
            self.locations.clone(),
            update,
            self.config.persist_timeout(),
        ))
        .await?;

        Ok(IngestReceipt { received_at })
    }
}

#[cfg(test)]
#[path = "ingestion_service_tests.rs"]
mod tests;
