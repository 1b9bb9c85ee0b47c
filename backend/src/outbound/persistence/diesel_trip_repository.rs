//! PostgreSQL-backed `TripRepository` implementation.
//!
//! Each lifecycle transition is one `UPDATE ... WHERE id = $1 AND status =
//! <expected> RETURNING ...`. PostgreSQL's row lock makes concurrent updates
//! of the same trip serialise; the loser re-evaluates the `WHERE` clause
//! against the winner's row, matches nothing, and gets no row back.
//!
//! The driver's own status follows the trip inside the same transaction:
//! accepting marks the driver `busy` and ending returns a busy driver to
//! `available` once none of their other trips is still accepted or started.
//! A missing driver row leaves the trip update intact.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{Double, Timestamptz, Uuid as SqlUuid};
use diesel_async::RunQueryDsl;
use tracing::warn;
use uuid::Uuid;

use crate::domain::ports::{TripRepository, TripRepositoryError};
use crate::domain::{DriverStatus, Trip, TripId, TripStatus, TripStatusChange, TripTransition};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::TripTransitionRow;
use super::pool::{DbPool, PoolError};
use super::schema::{drivers, trips};

macro_rules! returning_change {
    () => {
        " RETURNING id, driver_id, status"
    };
}

const INSERT_SQL: &str = r#"
INSERT INTO trips (id, rider_id, origin, destination, status, created_at)
VALUES (
    $1,
    $2,
    ST_SetSRID(ST_MakePoint($4, $3), 4326)::geography,
    ST_SetSRID(ST_MakePoint($6, $5), 4326)::geography,
    'requested',
    $7
)
"#;

const ACCEPT_SQL: &str = concat!(
    "UPDATE trips SET status = 'accepted', driver_id = $2 \
     WHERE id = $1 AND status = 'requested'",
    returning_change!()
);

const START_SQL: &str = concat!(
    "UPDATE trips SET status = 'started', started_at = $2 \
     WHERE id = $1 AND status = 'accepted'",
    returning_change!()
);

const END_SQL: &str = concat!(
    "UPDATE trips SET status = 'completed', ended_at = $2 \
     WHERE id = $1 AND status = 'started'",
    returning_change!()
);

/// Returns a busy driver to `available` unless another accepted or started
/// trip still names them.
const RELEASE_DRIVER_SQL: &str = r#"
UPDATE drivers SET status = 'available'
WHERE id = $1
  AND status = 'busy'
  AND NOT EXISTS (
      SELECT 1 FROM trips
      WHERE trips.driver_id = $1
        AND trips.status IN ('accepted', 'started')
  )
"#;

/// Diesel-backed implementation of the trip repository port.
#[derive(Clone)]
pub struct DieselTripRepository {
    pool: DbPool,
}

impl DieselTripRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> TripRepositoryError {
    map_basic_pool_error(error, TripRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> TripRepositoryError {
    map_basic_diesel_error(
        error,
        TripRepositoryError::query,
        TripRepositoryError::connection,
    )
}

async fn update_trip(
    conn: &mut diesel_async::AsyncPgConnection,
    trip_id: Uuid,
    transition: TripTransition,
    at: DateTime<Utc>,
) -> QueryResult<Option<TripTransitionRow>> {
    let updated: QueryResult<TripTransitionRow> = match transition {
        TripTransition::Accept { driver_id } => {
            sql_query(ACCEPT_SQL)
                .bind::<SqlUuid, _>(trip_id)
                .bind::<SqlUuid, _>(*driver_id.as_uuid())
                .get_result(conn)
                .await
        }
        TripTransition::Start => {
            sql_query(START_SQL)
                .bind::<SqlUuid, _>(trip_id)
                .bind::<Timestamptz, _>(at)
                .get_result(conn)
                .await
        }
        TripTransition::End => {
            sql_query(END_SQL)
                .bind::<SqlUuid, _>(trip_id)
                .bind::<Timestamptz, _>(at)
                .get_result(conn)
                .await
        }
    };
    updated.optional()
}

async fn sync_driver_status(
    conn: &mut diesel_async::AsyncPgConnection,
    driver_id: Uuid,
    transition: TripTransition,
) -> QueryResult<usize> {
    match transition {
        TripTransition::Accept { .. } => {
            diesel::update(drivers::table.filter(drivers::id.eq(driver_id)))
                .set(drivers::status.eq(DriverStatus::Busy.as_str()))
                .execute(conn)
                .await
        }
        TripTransition::End => {
            sql_query(RELEASE_DRIVER_SQL)
                .bind::<SqlUuid, _>(driver_id)
                .execute(conn)
                .await
        }
        TripTransition::Start => Ok(0),
    }
}

#[async_trait]
impl TripRepository for DieselTripRepository {
    async fn insert(&self, trip: &Trip) -> Result<(), TripRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        sql_query(INSERT_SQL)
            .bind::<SqlUuid, _>(*trip.id().as_uuid())
            .bind::<SqlUuid, _>(*trip.rider_id().as_uuid())
            .bind::<Double, _>(trip.origin().lat())
            .bind::<Double, _>(trip.origin().lng())
            .bind::<Double, _>(trip.destination().lat())
            .bind::<Double, _>(trip.destination().lng())
            .bind::<Timestamptz, _>(trip.created_at())
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn apply_transition(
        &self,
        trip_id: &TripId,
        transition: &TripTransition,
        at: DateTime<Utc>,
    ) -> Result<Option<TripStatusChange>, TripRepositoryError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let trip_uuid = *trip_id.as_uuid();
        let transition = *transition;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = conn
            .transaction(|conn| {
                async move {
                    let row = update_trip(conn, trip_uuid, transition, at).await?;
                    if let Some(driver_id) = row.as_ref().and_then(|row| row.driver_id) {
                        let synced = sync_driver_status(conn, driver_id, transition).await?;
                        if synced == 0 && matches!(transition, TripTransition::Accept { .. }) {
                            warn!(trip_id = %trip_uuid, %driver_id, "accepted trip names an unknown driver");
                        }
                    }
                    Ok(row)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        Ok(row.map(|row| row.into_change(transition.target())))
    }

    async fn find_status(
        &self,
        trip_id: &TripId,
    ) -> Result<Option<TripStatus>, TripRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let status: Option<String> = trips::table
            .filter(trips::id.eq(trip_id.as_uuid()))
            .select(trips::status)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        status
            .map(|raw| raw.parse::<TripStatus>())
            .transpose()
            .map_err(|err| TripRepositoryError::query(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ACCEPT_SQL, "status = 'requested'")]
    #[case(START_SQL, "status = 'accepted'")]
    #[case(END_SQL, "status = 'started'")]
    fn transitions_are_conditional_on_predecessor(#[case] sql: &str, #[case] guard: &str) {
        assert!(sql.contains(guard), "{sql}");
        assert!(sql.contains("RETURNING id, driver_id, status"), "{sql}");
    }

    #[rstest]
    fn driver_release_waits_for_other_active_trips() {
        assert!(RELEASE_DRIVER_SQL.contains("status = 'busy'"));
        assert!(RELEASE_DRIVER_SQL.contains("NOT EXISTS"));
        assert!(RELEASE_DRIVER_SQL.contains("IN ('accepted', 'started')"));
    }

    #[rstest]
    fn pool_errors_map_to_connection() {
        let err = map_pool_error(PoolError::checkout("timed out"));
        assert!(matches!(err, TripRepositoryError::Connection { .. }));
    }
}
