//! Dispatch entry-point: reads settings, selects adapters, and serves the REST
//! API, the location stream, and health checks until a shutdown signal.

use std::time::Duration;

use actix_web::web;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use ride_dispatch::inbound::http::health::HealthState;

mod server;

use server::{DispatchSettings, build_components, create_server};

/// Period between rate guard sweeps of expired client windows.
const RATE_GUARD_SWEEP_PERIOD: Duration = Duration::from_secs(60);

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = DispatchSettings::from_env(&mockable::DefaultEnv::new())
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidInput, err))?;
    info!(
        bind_addr = %settings.bind_addr(),
        database = settings.uses_database(),
        redis = settings.uses_redis(),
        "starting dispatch server"
    );

    let components = build_components(&settings).await?;
    let sweeper = components
        .rate_guard
        .clone()
        .spawn_sweeper(RATE_GUARD_SWEEP_PERIOD);

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), &components, &settings)?;
    let handle = server.handle();

    actix_web::rt::spawn(async move {
        wait_for_shutdown().await;
        info!("shutdown signal received");
        health_state.mark_unhealthy();
        handle.stop(true).await;
    });

    let result = server.await;

    sweeper.abort();
    components.ingestion.drain().await;
    info!("in-flight location side effects drained");
    result
}

/// Wait for SIGINT or SIGTERM.
async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
