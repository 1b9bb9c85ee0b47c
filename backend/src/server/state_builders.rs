//! Builders that select adapters and assemble the ports served by the app.
//!
//! PostgreSQL adapters are used when `DATABASE_URL` is configured; otherwise a
//! single shared [`InMemoryStore`] backs every storage port. The broadcaster
//! follows the same pattern with `REDIS_URL`.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::{info, warn};

use ride_dispatch::domain::ports::{
    DriverAvailabilityCommand, LocationBroadcaster, LocationRepository, NearbyDriversQuery,
    TripLifecycleCommand,
};
use ride_dispatch::domain::{
    DEFAULT_RATE_WINDOW, DriverAvailabilityService, IngestionConfig, LocationIngestionService,
    ProximityService, RateGuard, RateGuardConfig, TripLifecycleService,
};
use ride_dispatch::inbound::http::state::HttpState;
use ride_dispatch::inbound::ws::state::WsState;
use ride_dispatch::outbound::broadcast::{
    LoggingLocationBroadcaster, RedisLocationBroadcaster, RedisPoolConfig,
};
use ride_dispatch::outbound::memory::InMemoryStore;
use ride_dispatch::outbound::persistence::{
    DbPool, DieselDriverRepository, DieselLocationRepository, DieselTripRepository, PoolConfig,
};

use super::DispatchSettings;

/// Everything the HTTP server and the shutdown sequence need.
#[derive(Clone)]
pub struct DispatchComponents {
    pub(crate) http_state: web::Data<HttpState>,
    pub(crate) ws_state: web::Data<WsState>,
    pub(crate) rate_guard: Arc<RateGuard>,
    pub(crate) ingestion: Arc<LocationIngestionService>,
}

/// Ports backed by the configured store.
struct StoragePorts {
    trips: Arc<dyn TripLifecycleCommand>,
    nearby: Arc<dyn NearbyDriversQuery>,
    availability: Arc<dyn DriverAvailabilityCommand>,
    locations: Arc<dyn LocationRepository>,
}

fn memory_ports(clock: &Arc<dyn Clock>) -> StoragePorts {
    let store = Arc::new(InMemoryStore::new());
    StoragePorts {
        trips: Arc::new(TripLifecycleService::new(store.clone(), clock.clone())),
        nearby: Arc::new(ProximityService::new(store.clone(), clock.clone())),
        availability: Arc::new(DriverAvailabilityService::new(store.clone())),
        locations: store,
    }
}

fn diesel_ports(pool: &DbPool, clock: &Arc<dyn Clock>) -> StoragePorts {
    let drivers = Arc::new(DieselDriverRepository::new(pool.clone()));
    StoragePorts {
        trips: Arc::new(TripLifecycleService::new(
            Arc::new(DieselTripRepository::new(pool.clone())),
            clock.clone(),
        )),
        nearby: Arc::new(ProximityService::new(drivers.clone(), clock.clone())),
        availability: Arc::new(DriverAvailabilityService::new(drivers)),
        locations: Arc::new(DieselLocationRepository::new(pool.clone())),
    }
}

async fn build_storage(
    settings: &DispatchSettings,
    clock: &Arc<dyn Clock>,
) -> std::io::Result<StoragePorts> {
    match &settings.database_url {
        Some(url) => {
            let pool = DbPool::new(PoolConfig::new(url.as_str()))
                .await
                .map_err(|err| std::io::Error::other(format!("database pool: {err}")))?;
            info!("using PostgreSQL persistence");
            Ok(diesel_ports(&pool, clock))
        }
        None => {
            warn!("DATABASE_URL not set; using in-memory store");
            Ok(memory_ports(clock))
        }
    }
}

async fn build_broadcaster(
    settings: &DispatchSettings,
) -> std::io::Result<Arc<dyn LocationBroadcaster>> {
    let channel = settings.locations_channel.clone();
    match &settings.redis_url {
        Some(url) => {
            let broadcaster =
                RedisLocationBroadcaster::connect(RedisPoolConfig::new(url.as_str(), channel))
                    .await
                    .map_err(|err| std::io::Error::other(format!("redis pool: {err}")))?;
            info!(channel = %settings.locations_channel, "publishing locations to Redis");
            Ok(Arc::new(broadcaster))
        }
        None => {
            warn!("REDIS_URL not set; location broadcasts are logged only");
            Ok(Arc::new(LoggingLocationBroadcaster::new(channel)))
        }
    }
}

/// Select adapters for `settings` and build the shared application state.
///
/// # Errors
///
/// Returns [`std::io::Error`] when a configured database or Redis pool cannot
/// be constructed.
pub async fn build_components(settings: &DispatchSettings) -> std::io::Result<DispatchComponents> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let storage = build_storage(settings, &clock).await?;
    let broadcaster = build_broadcaster(settings).await?;

    let ingestion = Arc::new(LocationIngestionService::new(
        broadcaster,
        storage.locations,
        clock.clone(),
        IngestionConfig::default().with_max_in_flight(settings.persistence_concurrency),
    ));
    let rate_guard = Arc::new(RateGuard::new(
        RateGuardConfig::new(settings.rate_limit_per_minute, DEFAULT_RATE_WINDOW),
        clock,
    ));

    Ok(DispatchComponents {
        http_state: web::Data::new(HttpState::new(
            storage.trips,
            storage.nearby,
            storage.availability,
        )),
        ws_state: web::Data::new(WsState::new(ingestion.clone())),
        rate_guard,
        ingestion,
    })
}
