//! PostgreSQL-backed `LocationRepository` implementation.
//!
//! Locations are append-only history. Positions are stored as PostGIS
//! `geography(Point, 4326)`, which takes longitude before latitude.

use async_trait::async_trait;
use diesel::sql_query;
use diesel::sql_types::{Double, Nullable, Timestamptz, Uuid as SqlUuid};
use diesel_async::RunQueryDsl;

use crate::domain::LocationUpdate;
use crate::domain::ports::{LocationRepository, LocationRepositoryError};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::pool::{DbPool, PoolError};

const INSERT_LOCATION_SQL: &str = r#"
INSERT INTO locations (driver_id, geom, speed, heading, ts)
VALUES ($1, ST_SetSRID(ST_MakePoint($2, $3), 4326)::geography, $4, $5, $6)
"#;

/// Diesel-backed implementation of the location history port.
#[derive(Clone)]
pub struct DieselLocationRepository {
    pool: DbPool,
}

impl DieselLocationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> LocationRepositoryError {
    map_basic_pool_error(error, LocationRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> LocationRepositoryError {
    map_basic_diesel_error(
        error,
        LocationRepositoryError::query,
        LocationRepositoryError::connection,
    )
}

#[async_trait]
impl LocationRepository for DieselLocationRepository {
    async fn append(&self, update: &LocationUpdate) -> Result<(), LocationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        sql_query(INSERT_LOCATION_SQL)
            .bind::<SqlUuid, _>(*update.driver_id().as_uuid())
            .bind::<Double, _>(update.position().lng())
            .bind::<Double, _>(update.position().lat())
            .bind::<Nullable<Double>, _>(update.speed())
            .bind::<Nullable<Double>, _>(update.heading())
            .bind::<Timestamptz, _>(update.recorded_at())
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }
}
