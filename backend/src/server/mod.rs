//! Builds the dispatch app and binds the HTTP server.

mod config;
mod state_builders;

pub use config::DispatchSettings;
pub use state_builders::{DispatchComponents, build_components};

use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

#[cfg(debug_assertions)]
use ride_dispatch::ApiDoc;
use ride_dispatch::domain::RateGuard;
use ride_dispatch::inbound::http::configure_api;
use ride_dispatch::inbound::http::health::{HealthState, health, live, ready};
use ride_dispatch::inbound::http::state::HttpState;
use ride_dispatch::inbound::ws;
use ride_dispatch::inbound::ws::state::WsState;
use ride_dispatch::middleware::{RateLimit, Trace};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    ws_state: web::Data<WsState>,
    rate_guard: Arc<RateGuard>,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        ws_state,
        rate_guard,
    } = deps;

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(ws_state)
        .wrap(RateLimit::new(rate_guard))
        .wrap(Trace)
        .service(web::scope("/api").configure(configure_api))
        .service(ws::ws_entry)
        .service(ready)
        .service(live)
        .service(health);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Bind the dispatch API to `settings.bind_addr` and mark it ready.
///
/// The returned [`Server`] does nothing until awaited.
///
/// # Errors
/// Fails when the address cannot be bound.
pub fn create_server(
    health_state: web::Data<HealthState>,
    components: &DispatchComponents,
    settings: &DispatchSettings,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = components.http_state.clone();
    let ws_state = components.ws_state.clone();
    let rate_guard = components.rate_guard.clone();

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            ws_state: ws_state.clone(),
            rate_guard: rate_guard.clone(),
        })
    })
    .bind(settings.bind_addr())?
    .disable_signals()
    .run();

    health_state.mark_ready();
    Ok(server)
}
