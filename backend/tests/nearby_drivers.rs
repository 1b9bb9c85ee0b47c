//! Proximity search and driver availability over HTTP.

mod support;

use actix_web::http::StatusCode;
use support::{CENTER, Harness, HarnessOptions, spawn_dispatch};
use ride_dispatch::domain::{DriverId, DriverStatus, UserId};
use rstest::{fixture, rstest};
use serde_json::{Value, json};

#[fixture]
fn harness() -> Harness {
    spawn_dispatch(HarnessOptions::default())
}

async fn nearby(harness: &Harness, query: &str) -> (StatusCode, Value) {
    let mut response = awc::Client::default()
        .get(harness.url(&format!("/api/drivers/nearby?{query}")))
        .send()
        .await
        .expect("request sent");
    let status = response.status();
    let body = response.json::<Value>().await.expect("json body");
    (status, body)
}

fn center_query() -> String {
    format!("lat={}&lng={}", CENTER.0, CENTER.1)
}

async fn set_status(harness: &Harness, driver_id: DriverId, status: &str) -> (StatusCode, Value) {
    let mut response = awc::Client::default()
        .patch(harness.url(&format!("/api/drivers/{driver_id}/status")))
        .send_json(&json!({ "status": status }))
        .await
        .expect("request sent");
    let code = response.status();
    let body = response.json::<Value>().await.expect("json body");
    (code, body)
}

#[rstest]
#[actix_rt::test]
async fn stale_drivers_are_excluded_even_when_closer(harness: Harness) {
    let fresh = harness.available_driver();
    let stale = harness.available_driver();
    harness.record_position(fresh, 200.0, 5).await;
    harness.record_position(stale, 100.0, 30).await;

    let (status, body) = nearby(&harness, &center_query()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    let drivers = body["drivers"].as_array().expect("drivers array");
    assert_eq!(drivers.len(), 1);
    let first = drivers.first().expect("one driver");
    assert_eq!(first["driver_id"], fresh.to_string());
    let distance = first["distance_m"].as_f64().expect("distance");
    assert!((distance - 200.0).abs() < 1.0, "distance was {distance}");

    harness.stop().await;
}

#[rstest]
#[actix_rt::test]
async fn results_are_nearest_first_within_radius(harness: Harness) {
    let far = harness.available_driver();
    let near = harness.available_driver();
    let outside = harness.available_driver();
    harness.record_position(far, 600.0, 1).await;
    harness.record_position(near, 150.0, 1).await;
    harness.record_position(outside, 1_500.0, 1).await;

    let (status, body) = nearby(&harness, &center_query()).await;

    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body["drivers"]
        .as_array()
        .expect("drivers array")
        .iter()
        .filter_map(|driver| driver["driver_id"].as_str())
        .collect();
    assert_eq!(ids, [near.to_string(), far.to_string()]);

    let (_, wide) = nearby(&harness, &format!("{}&radius=2000", center_query())).await;
    assert_eq!(wide["count"], 3);

    harness.stop().await;
}

#[rstest]
#[actix_rt::test]
async fn unavailable_drivers_are_not_offered(harness: Harness) {
    let offline = DriverId::random();
    harness
        .store
        .register_driver(offline, UserId::random(), DriverStatus::Offline);
    harness.record_position(offline, 50.0, 1).await;

    let (_, body) = nearby(&harness, &center_query()).await;
    assert_eq!(body["count"], 0);

    let (status, body) = set_status(&harness, offline, "available").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "available");

    let (_, body) = nearby(&harness, &center_query()).await;
    assert_eq!(body["count"], 1);

    harness.stop().await;
}

#[rstest]
#[case("lng=-3.7038", "lat")]
#[case("lat=40.4168", "lng")]
#[case("lat=91&lng=0", "lat/lng")]
#[case("lat=40.4168&lng=-3.7038&radius=0", "radius")]
#[actix_rt::test]
async fn invalid_searches_are_rejected(
    harness: Harness,
    #[case] query: &str,
    #[case] field: &str,
) {
    let (status, body) = nearby(&harness, query).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["details"]["field"], field);

    harness.stop().await;
}

#[rstest]
#[actix_rt::test]
async fn busy_drivers_cannot_toggle_availability(harness: Harness) {
    let driver_id = DriverId::random();
    harness
        .store
        .register_driver(driver_id, UserId::random(), DriverStatus::Busy);

    let (status, body) = set_status(&harness, driver_id, "offline").await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "conflict");
    assert_eq!(harness.store.driver_status(&driver_id), Some(DriverStatus::Busy));

    harness.stop().await;
}

#[rstest]
#[actix_rt::test]
async fn unknown_drivers_are_not_found(harness: Harness) {
    let (status, body) = set_status(&harness, DriverId::random(), "offline").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");

    harness.stop().await;
}
