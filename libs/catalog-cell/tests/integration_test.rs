use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use catalog_cell::router::catalog_routes;
use shared_utils::test_utils::{JwtTestUtils, MockSupabaseResponses, TestConfig, TestUser};

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
        app: catalog_routes(test_config.to_arc()),
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
async fn test_list_specialists() {
    let harness = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/specialists"))
        .and(query_param("order", "last_name.asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::specialist_response(3, "Ana", "Torres"),
            MockSupabaseResponses::specialist_response(4, "Luis", "Vega")
        ])))
        .mount(&harness.mock_server)
        .await;

    let response = harness
        .app
        .oneshot(get_request(&harness.token, "/specialists"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["total"], json!(2));
    assert_eq!(body["specialists"][0]["last_name"], json!("Torres"));
}

#[tokio::test]
async fn test_list_services() {
    let harness = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/services"))
        .and(query_param("order", "name.asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::service_response(1, "Haircut", 25.0)
        ])))
        .mount(&harness.mock_server)
        .await;

    let response = harness
        .app
        .oneshot(get_request(&harness.token, "/services"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["total"], json!(1));
    assert_eq!(body["services"][0]["name"], json!("Haircut"));
}

#[tokio::test]
async fn test_specialists_for_service_resolves_join_table() {
    let harness = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/specialist_services"))
        .and(query_param("service_id", "eq.1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "specialist_id": 3 },
            { "specialist_id": 4 }
        ])))
        .mount(&harness.mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/specialists"))
        .and(query_param("specialist_id", "in.(3,4)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::specialist_response(3, "Ana", "Torres"),
            MockSupabaseResponses::specialist_response(4, "Luis", "Vega")
        ])))
        .mount(&harness.mock_server)
        .await;

    let response = harness
        .app
        .oneshot(get_request(&harness.token, "/services/1/specialists"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["total"], json!(2));
}

#[tokio::test]
async fn test_specialists_for_service_empty_without_links() {
    // No join rows means no second lookup at all.
    let harness = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/specialist_services"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&harness.mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/specialists"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&harness.mock_server)
        .await;

    let response = harness
        .app
        .oneshot(get_request(&harness.token, "/services/1/specialists"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["total"], json!(0));
}

#[tokio::test]
async fn test_catalog_requires_authentication() {
    let harness = setup().await;

    let request = Request::builder()
        .method("GET")
        .uri("/specialists")
        .body(Body::empty())
        .unwrap();

    let response = harness.app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
