//! Tests for the trip lifecycle service.

use std::sync::Arc;

use mockall::predicate::eq;
use rstest::{fixture, rstest};
use serde_json::json;

use super::*;
use crate::domain::ports::MockTripRepository;
use crate::domain::{ErrorCode, GeoPoint, RiderId};
use crate::test_support::{MutableClock, epoch};

#[fixture]
fn clock() -> Arc<MutableClock> {
    Arc::new(MutableClock::new(epoch()))
}

fn accepted(trip_id: TripId, driver_id: DriverId) -> TripStatusChange {
    TripStatusChange {
        trip_id,
        driver_id: Some(driver_id),
        status: TripStatus::Accepted,
    }
}

fn service(repo: MockTripRepository, clock: Arc<MutableClock>) -> TripLifecycleService<MockTripRepository> {
    TripLifecycleService::new(Arc::new(repo), clock)
}

#[rstest]
#[tokio::test]
async fn request_trip_persists_requested_trip(clock: Arc<MutableClock>) {
    let rider_id = RiderId::random();
    let mut repo = MockTripRepository::new();
    repo.expect_insert()
        .withf(move |trip| trip.rider_id() == &rider_id && trip.status() == TripStatus::Requested)
        .times(1)
        .return_once(|_| Ok(()));

    let trip = service(repo, clock)
        .request_trip(RequestTripRequest {
            rider_id,
            origin: GeoPoint::new(0.0, 0.0).expect("origin"),
            destination: GeoPoint::new(1.0, 1.0).expect("destination"),
        })
        .await
        .expect("trip requested");

    assert_eq!(trip.status(), TripStatus::Requested);
    assert_eq!(trip.created_at(), epoch());
    assert!(trip.driver_id().is_none());
}

#[rstest]
#[tokio::test]
async fn accept_returns_new_status_without_status_read(clock: Arc<MutableClock>) {
    let trip_id = TripId::random();
    let driver_id = DriverId::random();
    let mut repo = MockTripRepository::new();
    repo.expect_apply_transition()
        .with(
            eq(trip_id),
            eq(TripTransition::Accept { driver_id }),
            eq(epoch()),
        )
        .times(1)
        .return_once(move |id, _, _| Ok(Some(accepted(*id, driver_id))));
    repo.expect_find_status().times(0);

    let change = service(repo, clock)
        .accept(trip_id, driver_id)
        .await
        .expect("accept succeeds");

    assert_eq!(change.status, TripStatus::Accepted);
    assert_eq!(change.driver_id, Some(driver_id));
}

#[rstest]
#[tokio::test]
async fn unmatched_transition_on_unknown_trip_is_not_found(clock: Arc<MutableClock>) {
    let mut repo = MockTripRepository::new();
    repo.expect_apply_transition()
        .times(1)
        .return_once(|_, _, _| Ok(None));
    repo.expect_find_status().times(1).return_once(|_| Ok(None));

    let err = service(repo, clock)
        .start(TripId::random())
        .await
        .expect_err("unknown trip");

    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn end_on_requested_trip_is_conflict_with_details(clock: Arc<MutableClock>) {
    let trip_id = TripId::random();
    let mut repo = MockTripRepository::new();
    repo.expect_apply_transition()
        .withf(|_, transition, _| *transition == TripTransition::End)
        .times(1)
        .return_once(|_, _, _| Ok(None));
    repo.expect_find_status()
        .with(eq(trip_id))
        .times(1)
        .return_once(|_| Ok(Some(TripStatus::Requested)));

    let err = service(repo, clock)
        .end(trip_id)
        .await
        .expect_err("end from requested must fail");

    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(
        err.details(),
        Some(&json!({
            "tripId": trip_id.to_string(),
            "currentStatus": "requested",
            "expectedStatus": "started",
        }))
    );
}

#[rstest]
#[case(TripRepositoryError::connection("refused"), ErrorCode::ServiceUnavailable)]
#[case(TripRepositoryError::query("syntax"), ErrorCode::InternalError)]
#[tokio::test]
async fn repository_errors_are_mapped(
    clock: Arc<MutableClock>,
    #[case] failure: TripRepositoryError,
    #[case] expected: ErrorCode,
) {
    let mut repo = MockTripRepository::new();
    repo.expect_apply_transition()
        .times(1)
        .return_once(move |_, _, _| Err(failure));
    repo.expect_find_status().times(0);

    let err = service(repo, clock)
        .accept(TripId::random(), DriverId::random())
        .await
        .expect_err("repository failure");

    assert_eq!(err.code(), expected);
}

#[rstest]
#[tokio::test]
async fn transitions_are_stamped_with_clock_time(clock: Arc<MutableClock>) {
    clock.advance_seconds(90);
    let expected_at = epoch() + chrono::TimeDelta::seconds(90);
    let mut repo = MockTripRepository::new();
    repo.expect_apply_transition()
        .withf(move |_, _, at| *at == expected_at)
        .times(1)
        .return_once(|_, _, _| Ok(None));
    repo.expect_find_status()
        .return_once(|_| Ok(Some(TripStatus::Completed)));

    let err = service(repo, clock)
        .end(TripId::random())
        .await
        .expect_err("already completed");
    assert_eq!(err.code(), ErrorCode::Conflict);
}
