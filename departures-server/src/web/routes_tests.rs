//! Router tests.

use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::Request;
use serde_json::Value;
use tower::ServiceExt;

use super::*;
use crate::domain::{Stop, StopVisit};
use crate::schedule::{InMemoryScheduleStore, StoreError};
use crate::search::SearchConfig;

const PATH: &str = "/public_transport/city/wroclaw/closest_departures";

fn store() -> InMemoryScheduleStore {
    InMemoryScheduleStore::builder()
        .stop("4513", "Rynek", 51.1009, 17.0)
        .stop("4611", "Plac Grunwaldzki", 51.1081, 17.0)
        .trip("3_100", "A", "Biskupin")
        .trip("3_200", "10", "Leśnica")
        .stop_time("3_100", "4513", 1, "08:10:00", "08:10:30")
        .stop_time("3_100", "4611", 2, "08:15:00", "08:15:00")
        .stop_time("3_200", "4611", 1, "08:20:00", "08:20:00")
        .build()
}

fn app<S: ScheduleStore + 'static>(store: S) -> Router {
    create_router(AppState::new(store, SearchConfig::default(), "wroclaw"))
}

async fn get(router: Router, uri: &str) -> (StatusCode, Value) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn query(params: &str) -> String {
    format!("{PATH}?{params}")
}

const VALID: &str = "start_coordinates=51.1,17.0&end_coordinates=51.2,17.0&start_time=2025-04-02T08:00:00Z";

struct FailingStore;

impl ScheduleStore for FailingStore {
    async fn stops(&self) -> Result<Arc<[Stop]>, StoreError> {
        Err(StoreError::QueryFailed("no such table: stops".into()))
    }

    async fn stop_visits(&self, _stop_ids: &[String]) -> Result<Vec<StopVisit>, StoreError> {
        Ok(Vec::new())
    }
}

struct PanickingStore;

impl ScheduleStore for PanickingStore {
    async fn stops(&self) -> Result<Arc<[Stop]>, StoreError> {
        panic!("stop list poisoned")
    }

    async fn stop_visits(&self, _stop_ids: &[String]) -> Result<Vec<StopVisit>, StoreError> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn health_check() {
    let response = app(store())
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"ok");
}

#[tokio::test]
async fn index_names_city() {
    let response = app(store())
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains("/public_transport/city/wroclaw/"));
}

#[tokio::test]
async fn returns_departures() {
    let (status, body) = get(app(store()), &query(&format!("{VALID}&limit=2"))).await;

    assert_eq!(status, StatusCode::OK);

    let metadata = &body["metadata"];
    assert_eq!(metadata["city"], "wroclaw");
    assert_eq!(metadata["self"], query(&format!("{VALID}&limit=2")));
    assert_eq!(metadata["query_parameters"]["start_coordinates"], "51.1,17.0");
    assert_eq!(metadata["query_parameters"]["end_coordinates"], "51.2,17.0");
    assert_eq!(metadata["query_parameters"]["start_time"], "2025-04-02T08:00:00Z");
    assert_eq!(metadata["query_parameters"]["limit"], 2);

    let departures = body["departures"].as_array().unwrap();
    assert_eq!(departures.len(), 2);
    assert_eq!(departures[0]["trip_id"], "3_100");
    assert_eq!(departures[0]["route_id"], "A");
    assert_eq!(departures[0]["trip_headsign"], "Biskupin");
    assert_eq!(departures[0]["stop"]["name"], "Rynek");
    assert_eq!(departures[0]["stop"]["coordinates"]["latitude"], 51.1009);
    assert_eq!(departures[0]["stop"]["arrival_time"], "2025-04-02T08:10:00Z");
    assert_eq!(departures[0]["stop"]["departure_time"], "2025-04-02T08:10:30Z");
    assert_eq!(departures[1]["trip_id"], "3_200");
}

#[tokio::test]
async fn default_limit_applied() {
    let (status, body) = get(app(store()), &query(VALID)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["metadata"]["query_parameters"]["limit"], 5);
}

#[tokio::test]
async fn empty_result_is_ok() {
    let params = "start_coordinates=50.0,19.9&end_coordinates=50.1,19.9&start_time=2025-04-02T08:00:00Z";
    let (status, body) = get(app(store()), &query(params)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["departures"], Value::Array(Vec::new()));
}

#[tokio::test]
async fn city_is_case_insensitive() {
    let uri = format!("/public_transport/city/WroClaw/closest_departures?{VALID}");
    let (status, body) = get(app(store()), &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["metadata"]["city"], "WroClaw");
}

#[tokio::test]
async fn unsupported_city() {
    let uri = format!("/public_transport/city/krakow/closest_departures?{VALID}");
    let (status, body) = get(app(store()), &uri).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "City not supported");
}

#[tokio::test]
async fn city_checked_before_parameters() {
    let (status, _) = get(app(store()), "/public_transport/city/gdansk/closest_departures").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_parameters_are_named() {
    let (status, body) = get(app(store()), &query("end_coordinates=51.2,17.0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required parameter: start_coordinates");

    let (status, body) = get(app(store()), &query("start_coordinates=51.1,17.0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required parameter: end_coordinates");

    let (status, body) = get(app(store()), PATH).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required parameter: start_coordinates");
}

#[tokio::test]
async fn empty_parameter_counts_as_missing() {
    let (status, body) = get(
        app(store()),
        &query("start_coordinates=&end_coordinates=51.2,17.0"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required parameter: start_coordinates");
}

#[tokio::test]
async fn malformed_coordinates() {
    for params in [
        "start_coordinates=51.1&end_coordinates=51.2,17.0",
        "start_coordinates=51.1,17.0&end_coordinates=north",
        "start_coordinates=51.1,17.0,3&end_coordinates=51.2,17.0",
    ] {
        let (status, body) = get(app(store()), &query(params)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{params}");
        assert_eq!(body["error"], "Invalid coordinate format. Expected: \"lat,lon\"");
    }
}

#[tokio::test]
async fn out_of_range_coordinates() {
    let (status, body) = get(
        app(store()),
        &query("start_coordinates=91,17.0&end_coordinates=51.2,17.0"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid start coordinates");

    let (status, body) = get(
        app(store()),
        &query("start_coordinates=51.1,17.0&end_coordinates=51.2,181"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid end coordinates");
}

#[tokio::test]
async fn invalid_start_time() {
    let (status, body) = get(
        app(store()),
        &query("start_coordinates=51.1,17.0&end_coordinates=51.2,17.0&start_time=tomorrow"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid start_time format. Expected ISO 8601");
}

#[tokio::test]
async fn invalid_limits() {
    for limit in ["-1", "0", "two", "1.5"] {
        let (status, body) = get(app(store()), &query(&format!("{VALID}&limit={limit}"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "limit={limit}");
        assert_eq!(body["error"], "Invalid limit. Expected positive integer");
    }
}

#[tokio::test]
async fn store_failure_is_database_error() {
    let (status, body) = get(app(FailingStore), &query(VALID)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Database error: query failed: no such table: stops");
}

#[tokio::test]
async fn panic_becomes_generic_error() {
    let (status, body) = get(app(PanickingStore), &query(VALID)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal server error");
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let response = app(store())
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("origin", "https://example.org")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "*"
    );
}

#[test]
fn limit_parsing() {
    assert_eq!(parse_limit("3"), Some(3));
    assert_eq!(parse_limit(" 7 "), Some(7));
    assert_eq!(parse_limit("0"), None);
    assert_eq!(parse_limit("-2"), None);
    assert_eq!(parse_limit("x"), None);
}
