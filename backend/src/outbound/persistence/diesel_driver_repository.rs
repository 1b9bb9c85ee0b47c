//! PostgreSQL-backed driver availability and proximity search.
//!
//! One adapter serves both ports because both read the `drivers` table. The
//! proximity search picks each driver's latest location newer than the
//! staleness cutoff, then filters and orders candidates with PostGIS.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Double, Timestamptz};
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{
    DriverRepository, DriverRepositoryError, NearbyDriversRepository,
    NearbyDriversRepositoryError, ProximitySearch,
};
use crate::domain::{DriverId, DriverStatus, NearbyDriver};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::NearbyDriverRow;
use super::pool::{DbPool, PoolError};
use super::schema::drivers;

const NEARBY_SQL: &str = r#"
WITH latest AS (
    SELECT DISTINCT ON (l.driver_id) l.driver_id, l.geom, l.ts
    FROM locations l
    WHERE l.ts > $4
    ORDER BY l.driver_id, l.ts DESC
)
SELECT
    d.id AS driver_id,
    d.user_id,
    ST_Distance(latest.geom, ST_SetSRID(ST_MakePoint($2, $1), 4326)::geography) AS distance_m,
    ST_Y(latest.geom::geometry) AS lat,
    ST_X(latest.geom::geometry) AS lng
FROM drivers d
JOIN latest ON latest.driver_id = d.id
WHERE d.status = 'available'
  AND ST_DWithin(latest.geom, ST_SetSRID(ST_MakePoint($2, $1), 4326)::geography, $3)
ORDER BY distance_m
LIMIT $5
"#;

/// Diesel-backed implementation of the driver ports.
#[derive(Clone)]
pub struct DieselDriverRepository {
    pool: DbPool,
}

impl DieselDriverRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> DriverRepositoryError {
    map_basic_pool_error(error, DriverRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> DriverRepositoryError {
    map_basic_diesel_error(
        error,
        DriverRepositoryError::query,
        DriverRepositoryError::connection,
    )
}

fn map_nearby_pool_error(error: PoolError) -> NearbyDriversRepositoryError {
    map_basic_pool_error(error, NearbyDriversRepositoryError::connection)
}

fn map_nearby_diesel_error(error: diesel::result::Error) -> NearbyDriversRepositoryError {
    map_basic_diesel_error(
        error,
        NearbyDriversRepositoryError::query,
        NearbyDriversRepositoryError::connection,
    )
}

fn collect_candidates(rows: Vec<NearbyDriverRow>) -> Vec<NearbyDriver> {
    rows.into_iter()
        .filter_map(|row| match NearbyDriver::try_from(row) {
            Ok(driver) => Some(driver),
            Err(reason) => {
                warn!(%reason, "skipping malformed nearby driver row");
                None
            }
        })
        .collect()
}

#[async_trait]
impl DriverRepository for DieselDriverRepository {
    async fn update_availability(
        &self,
        driver_id: &DriverId,
        status: DriverStatus,
    ) -> Result<bool, DriverRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(
            drivers::table
                .filter(drivers::id.eq(driver_id.as_uuid()))
                .filter(drivers::status.ne(DriverStatus::Busy.as_str())),
        )
        .set(drivers::status.eq(status.as_str()))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn find_status(
        &self,
        driver_id: &DriverId,
    ) -> Result<Option<DriverStatus>, DriverRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let status: Option<String> = drivers::table
            .filter(drivers::id.eq(driver_id.as_uuid()))
            .select(drivers::status)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        status
            .map(|raw| raw.parse::<DriverStatus>())
            .transpose()
            .map_err(|err| DriverRepositoryError::query(err.to_string()))
    }
}

#[async_trait]
impl NearbyDriversRepository for DieselDriverRepository {
    async fn find_nearby(
        &self,
        search: &ProximitySearch,
    ) -> Result<Vec<NearbyDriver>, NearbyDriversRepositoryError> {
        let limit = i64::try_from(search.limit).unwrap_or(i64::MAX);
        let mut conn = self.pool.get().await.map_err(map_nearby_pool_error)?;
        let rows: Vec<NearbyDriverRow> = sql_query(NEARBY_SQL)
            .bind::<Double, _>(search.center.lat())
            .bind::<Double, _>(search.center.lng())
            .bind::<Double, _>(search.radius_m)
            .bind::<Timestamptz, _>(search.seen_since)
            .bind::<BigInt, _>(limit)
            .load(&mut conn)
            .await
            .map_err(map_nearby_diesel_error)?;
        Ok(collect_candidates(rows))
    }
}
