//! PostgreSQL/PostGIS adapters for the storage ports.
//!
//! Geography columns are read and written with raw `sql_query` statements;
//! plain columns go through the Diesel DSL. A trip transition is one
//! conditional `UPDATE`, and the assigned driver's status follows it inside
//! the same transaction. Every failure surfaces as the port's `Connection` or
//! `Query` error.
//!
//! ```ignore
//! use ride_dispatch::outbound::persistence::{DbPool, DieselTripRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/dispatch")).await?;
//! let trips = DieselTripRepository::new(pool);
//! ```

mod diesel_basic_error_mapping;
mod diesel_driver_repository;
mod diesel_location_repository;
mod diesel_trip_repository;
mod models;
mod pool;
mod schema;

pub use diesel_driver_repository::DieselDriverRepository;
pub use diesel_location_repository::DieselLocationRepository;
pub use diesel_trip_repository::DieselTripRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
