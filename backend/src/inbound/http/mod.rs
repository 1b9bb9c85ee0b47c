//! HTTP inbound adapter exposing REST endpoints.

use actix_web::web;

pub mod drivers;
pub mod error;
pub mod health;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod trips;
mod validation;

pub use error::ApiResult;

/// Register the `/api` routes and their extractor error handlers.
///
/// Mount inside a scope, e.g. `web::scope("/api").configure(configure_api)`.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(validation::json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(validation::query_error_handler))
        .app_data(web::PathConfig::default().error_handler(validation::path_error_handler))
        .service(drivers::nearby_drivers)
        .service(drivers::set_driver_status)
        .service(trips::create_trip)
        .service(trips::accept_trip)
        .service(trips::start_trip)
        .service(trips::end_trip);
}
