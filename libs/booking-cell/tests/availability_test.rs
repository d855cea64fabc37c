use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use booking_cell::router::reservation_routes;
use shared_utils::test_utils::{JwtTestUtils, MockSupabaseResponses, TestConfig, TestUser};

const SPECIALIST_ID: i64 = 3;
const SERVICE_ID: i64 = 1;
const DATE: &str = "2024-06-01";

struct TestHarness {
    app: Router,
    token: String,
    mock_server: MockServer,
}

async fn setup() -> TestHarness {
    let mock_server = MockServer::start().await;
    let user = TestUser::client("client@example.com");

    let test_config = TestConfig {
        supabase_url: mock_server.uri(),
        ..TestConfig::default()
    };
    let token = JwtTestUtils::create_test_token(&user, &test_config.jwt_secret, Some(1));

    TestHarness {
        app: reservation_routes(test_config.to_arc()),
        token,
        mock_server,
    }
}

fn get_request(token: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_availability_lists_open_slots_ordered_by_time() {
    let harness = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/specialist_schedules"))
        .and(query_param("specialist_id", format!("eq.{}", SPECIALIST_ID)))
        .and(query_param("date", format!("eq.{}", DATE)))
        .and(query_param("available", "is.true"))
        .and(query_param("order", "time.asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::slot_response(7, SPECIALIST_ID, DATE, "10:00:00", true),
            MockSupabaseResponses::slot_response(8, SPECIALIST_ID, DATE, "11:00:00", true)
        ])))
        .mount(&harness.mock_server)
        .await;

    let response = harness
        .app
        .oneshot(get_request(
            &harness.token,
            &format!("/availability?specialist_id={}&date={}", SPECIALIST_ID, DATE),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["total"], json!(2));
    assert_eq!(body["slots"][0]["time"], json!("10:00:00"));
    assert_eq!(body["slots"][1]["time"], json!("11:00:00"));
}

#[tokio::test]
async fn test_service_availability_drops_times_held_by_reservations() {
    // The 10:00 slot is still flagged available, but a non-cancelled
    // reservation already holds that time. The cross-check filters it out.
    let harness = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/specialist_schedules"))
        .and(query_param("available", "is.true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::slot_response(7, SPECIALIST_ID, DATE, "10:00:00", true),
            MockSupabaseResponses::slot_response(8, SPECIALIST_ID, DATE, "11:00:00", true)
        ])))
        .mount(&harness.mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/reservations"))
        .and(query_param("select", "time"))
        .and(query_param("service_id", format!("eq.{}", SERVICE_ID)))
        .and(query_param("status", "neq.cancelled"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "time": "10:00:00" }
        ])))
        .mount(&harness.mock_server)
        .await;

    let response = harness
        .app
        .oneshot(get_request(
            &harness.token,
            &format!(
                "/availability/by-service?specialist_id={}&service_id={}&date={}",
                SPECIALIST_ID, SERVICE_ID, DATE
            ),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["total"], json!(1));
    assert_eq!(body["slots"][0]["id"], json!(8));
}

#[tokio::test]
async fn test_service_availability_empty_when_all_times_reserved() {
    let harness = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/specialist_schedules"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::slot_response(7, SPECIALIST_ID, DATE, "10:00:00", true)
        ])))
        .mount(&harness.mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/reservations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "time": "10:00:00" }
        ])))
        .mount(&harness.mock_server)
        .await;

    let response = harness
        .app
        .oneshot(get_request(
            &harness.token,
            &format!(
                "/availability/by-service?specialist_id={}&service_id={}&date={}",
                SPECIALIST_ID, SERVICE_ID, DATE
            ),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["total"], json!(0));
}

#[tokio::test]
async fn test_reservation_history_is_ordered_by_recorded_at() {
    let harness = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/reservation_history"))
        .and(query_param("reservation_id", "eq.12"))
        .and(query_param("order", "recorded_at.asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::history_response(12, "pending"),
            MockSupabaseResponses::history_response(12, "cancelled")
        ])))
        .mount(&harness.mock_server)
        .await;

    let response = harness
        .app
        .oneshot(get_request(&harness.token, "/12/history"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["reservation_id"], json!(12));
    assert_eq!(body["history"][0]["status"], json!("pending"));
    assert_eq!(body["history"][1]["status"], json!("cancelled"));
}

#[tokio::test]
async fn test_availability_rejects_invalid_token() {
    let harness = setup().await;
    let token = JwtTestUtils::create_malformed_token();

    let response = harness
        .app
        .oneshot(get_request(
            &token,
            &format!("/availability?specialist_id={}&date={}", SPECIALIST_ID, DATE),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
