//! Ride dispatch library modules.
//!
//! The crate follows a hexagonal layout: [`domain`] holds entities, services,
//! and ports; [`inbound`] adapts HTTP and WebSocket traffic onto the driving
//! ports; [`outbound`] implements the driven ports over PostgreSQL/PostGIS,
//! Redis, or process memory.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(test)]
mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::{RateLimit, Trace};
