//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};

use crate::domain::ports::{
    MockDriverAvailabilityCommand, MockNearbyDriversQuery, MockTripLifecycleCommand,
};
use crate::inbound::http::state::HttpState;

/// Port doubles for one test; unset mocks panic if a handler touches them.
#[derive(Default)]
pub struct MockPorts {
    pub trips: MockTripLifecycleCommand,
    pub nearby: MockNearbyDriversQuery,
    pub availability: MockDriverAvailabilityCommand,
}

/// Build an app serving the `/api` routes over the given doubles.
pub fn api_app(
    ports: MockPorts,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let state = HttpState::new(
        Arc::new(ports.trips),
        Arc::new(ports.nearby),
        Arc::new(ports.availability),
    );
    App::new()
        .app_data(web::Data::new(state))
        .service(web::scope("/api").configure(super::configure_api))
}
