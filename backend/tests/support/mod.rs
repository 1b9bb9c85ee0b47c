//! Shared harness for dispatch integration tests.
//!
//! Integration tests compile as separate crates, so the server wiring lives
//! here to keep every suite exercising the same app shape as production:
//! rate limiting and tracing wrapped around the `/api` scope, the location
//! stream, and the health checks, all backed by one in-memory store.

#![allow(dead_code, reason = "each test crate uses a different subset")]

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use actix_web::dev::ServerHandle;
use actix_web::{App, HttpServer, web};
use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;
use ride_dispatch::domain::{
    DEFAULT_RATE_WINDOW, DriverAvailabilityService, DriverId, DriverStatus, IngestionConfig,
    LocationIngestionService, LocationReport, LocationUpdate, ProximityService, RateGuard,
    RateGuardConfig, TripLifecycleService, UserId,
};
use ride_dispatch::domain::ports::LocationRepository;
use ride_dispatch::inbound::http::configure_api;
use ride_dispatch::inbound::http::health::{HealthState, health, live, ready};
use ride_dispatch::inbound::http::state::HttpState;
use ride_dispatch::inbound::ws;
use ride_dispatch::inbound::ws::state::WsState;
use ride_dispatch::middleware::{RateLimit, Trace};
use ride_dispatch::outbound::broadcast::LoggingLocationBroadcaster;
use ride_dispatch::outbound::memory::InMemoryStore;

/// Centre of the proximity scenarios (Puerta del Sol, Madrid).
pub const CENTER: (f64, f64) = (40.4168, -3.7038);

/// Metres per degree of latitude for the haversine radius in use.
const METRES_PER_DEGREE_LAT: f64 = 111_194.93;

/// Clock fixed at a test-chosen instant that only moves when advanced.
pub struct TestClock(Mutex<DateTime<Utc>>);

impl TestClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance_seconds(&self, seconds: i64) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) += TimeDelta::seconds(seconds);
    }
}

impl Clock for TestClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Fixed "now" shared by the scenarios.
pub fn now() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).expect("fixture timestamp")
}

/// Options for [`spawn_dispatch`].
pub struct HarnessOptions {
    pub rate_limit: u32,
    pub clock: Arc<TestClock>,
}

impl Default for HarnessOptions {
    fn default() -> Self {
        Self {
            rate_limit: 10_000,
            clock: Arc::new(TestClock::at(now())),
        }
    }
}

/// A running dispatch server bound to an ephemeral port.
pub struct Harness {
    pub store: Arc<InMemoryStore>,
    pub clock: Arc<TestClock>,
    pub base_url: String,
    handle: ServerHandle,
}

impl Harness {
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub fn ws_url(&self) -> String {
        self.url("/ws")
    }

    /// Current harness time in whole seconds since the Unix epoch.
    pub fn clock_now_seconds(&self) -> i64 {
        self.clock.utc().timestamp()
    }

    /// Register an available driver with a fresh user account.
    pub fn available_driver(&self) -> DriverId {
        let driver_id = DriverId::random();
        self.store
            .register_driver(driver_id, UserId::random(), DriverStatus::Available);
        driver_id
    }

    /// Record a position `north_m` metres north of [`CENTER`], reported
    /// `age_s` seconds before the harness clock's current time.
    pub async fn record_position(&self, driver_id: DriverId, north_m: f64, age_s: i64) {
        let recorded_at = self.clock.utc() - TimeDelta::seconds(age_s);
        let report = LocationReport {
            driver_id: driver_id.to_string(),
            lat: CENTER.0 + north_m / METRES_PER_DEGREE_LAT,
            lng: CENTER.1,
            ts_ms: Some(recorded_at.timestamp_millis()),
            speed: None,
            heading: None,
        };
        let update = LocationUpdate::from_report(report, self.clock.utc()).expect("valid report");
        self.store.append(&update).await.expect("append location");
    }

    /// Poll the store until `driver_id` has `count` recorded locations.
    pub async fn wait_for_locations(&self, driver_id: &DriverId, count: usize) {
        for _ in 0..200 {
            if self.store.locations_for(driver_id).len() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("timed out waiting for {count} locations for driver {driver_id}");
    }

    pub async fn stop(self) {
        self.handle.stop(true).await;
    }
}

/// Start a dispatch server wired against a fresh in-memory store.
pub fn spawn_dispatch(options: HarnessOptions) -> Harness {
    let HarnessOptions { rate_limit, clock } = options;
    let store = Arc::new(InMemoryStore::new());
    let dyn_clock: Arc<dyn Clock> = clock.clone();

    let http_state = web::Data::new(HttpState::new(
        Arc::new(TripLifecycleService::new(store.clone(), dyn_clock.clone())),
        Arc::new(ProximityService::new(store.clone(), dyn_clock.clone())),
        Arc::new(DriverAvailabilityService::new(store.clone())),
    ));
    let ws_state = web::Data::new(WsState::new(Arc::new(LocationIngestionService::new(
        Arc::new(LoggingLocationBroadcaster::new("locations")),
        store.clone(),
        dyn_clock.clone(),
        IngestionConfig::default(),
    ))));
    let rate_guard = Arc::new(RateGuard::new(
        RateGuardConfig::new(rate_limit, DEFAULT_RATE_WINDOW),
        dyn_clock,
    ));
    let health_state = web::Data::new(HealthState::new());
    health_state.mark_ready();

    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");
    let server = HttpServer::new(move || {
        App::new()
            .app_data(health_state.clone())
            .app_data(http_state.clone())
            .app_data(ws_state.clone())
            .wrap(RateLimit::new(rate_guard.clone()))
            .wrap(Trace)
            .service(web::scope("/api").configure(configure_api))
            .service(ws::ws_entry)
            .service(ready)
            .service(live)
            .service(health)
    })
    .workers(1)
    .listen(listener)
    .expect("bind test server")
    .disable_signals()
    .run();
    let handle = server.handle();
    actix_web::rt::spawn(server);

    Harness {
        store,
        clock,
        base_url: format!("http://{addr}"),
        handle,
    }
}
