//! Tests for driver HTTP handlers.

use super::*;
use crate::domain::{DriverId, GeoPoint, UserId};
use crate::inbound::http::test_utils::{MockPorts, api_app};
use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use mockall::predicate::eq;
use rstest::rstest;
use serde_json::Value;

const DRIVER_ID: &str = "9c7e4b2a-1d3f-4a5b-8c6d-0e1f2a3b4c5d";

fn candidate(distance_m: f64) -> NearbyDriver {
    NearbyDriver {
        driver_id: DriverId::random(),
        user_id: UserId::random(),
        distance_m,
        position: GeoPoint::new(0.001, 0.001).expect("valid point"),
    }
}

#[rstest]
#[actix_web::test]
async fn nearby_returns_drivers_and_count() {
    let mut ports = MockPorts::default();
    ports
        .nearby
        .expect_nearby()
        .with(eq(NearbyDriversRequest {
            lat: Some(0.0),
            lng: Some(0.0),
            radius_m: Some(500.0),
        }))
        .times(1)
        .returning(|_| Ok(vec![candidate(120.5), candidate(200.0)]));
    let app = actix_test::init_service(api_app(ports)).await;

    let body: Value = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/drivers/nearby?lat=0&lng=0&radius=500")
            .to_request(),
    )
    .await;

    assert_eq!(body["count"], 2);
    assert_eq!(body["drivers"][0]["distance_m"], 120.5);
    assert!(body["drivers"][0]["driver_id"].is_string());
    assert!(body["drivers"][0]["lat"].is_number());
}

#[rstest]
#[actix_web::test]
async fn nearby_forwards_missing_coordinates_to_validation() {
    let mut ports = MockPorts::default();
    ports
        .nearby
        .expect_nearby()
        .with(eq(NearbyDriversRequest {
            lat: None,
            lng: Some(0.0),
            radius_m: None,
        }))
        .returning(|_| Err(Error::invalid_request("lat is required")));
    let app = actix_test::init_service(api_app(ports)).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/drivers/nearby?lng=0")
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[rstest]
#[actix_web::test]
async fn non_numeric_coordinates_are_rejected() {
    let app = actix_test::init_service(api_app(MockPorts::default())).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/drivers/nearby?lat=north&lng=0")
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["details"]["code"], "malformed_query");
}

#[rstest]
#[actix_web::test]
async fn store_outage_surfaces_as_service_unavailable() {
    let mut ports = MockPorts::default();
    ports
        .nearby
        .expect_nearby()
        .returning(|_| Err(Error::service_unavailable("location store unavailable")));
    let app = actix_test::init_service(api_app(ports)).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/drivers/nearby?lat=0&lng=0")
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[rstest]
#[actix_web::test]
async fn set_status_returns_new_status() {
    let mut ports = MockPorts::default();
    let driver_id = DriverId::new(DRIVER_ID).expect("driver id");
    ports
        .availability
        .expect_set_status()
        .with(eq(driver_id), eq(DriverStatus::Offline))
        .times(1)
        .returning(|_, status| Ok(status));
    let app = actix_test::init_service(api_app(ports)).await;

    let body: Value = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::patch()
            .uri(&format!("/api/drivers/{DRIVER_ID}/status"))
            .set_json(serde_json::json!({ "status": "offline" }))
            .to_request(),
    )
    .await;

    assert_eq!(body["driver_id"], DRIVER_ID);
    assert_eq!(body["status"], "offline");
}

#[rstest]
#[actix_web::test]
async fn set_status_rejects_unknown_values() {
    let app = actix_test::init_service(api_app(MockPorts::default())).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::patch()
            .uri(&format!("/api/drivers/{DRIVER_ID}/status"))
            .set_json(serde_json::json!({ "status": "asleep" }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["details"]["code"], "invalid_status");
}
