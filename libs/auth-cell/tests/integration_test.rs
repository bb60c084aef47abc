use std::sync::Arc;

use axum::{
    body::Body,
    http::{header::SET_COOKIE, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use auth_cell::router::auth_routes;
use auth_cell::PasswordService;
use shared_config::AppConfig;
use shared_utils::test_utils::{JwtTestUtils, MockDbResponses, TestConfig, TestUser};

fn create_test_app(config: AppConfig) -> Router {
    auth_routes(Arc::new(config))
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Patient row whose stored hash matches `password`.
fn stored_patient(id: &str, email: &str, password: &str) -> Value {
    let mut row = MockDbResponses::patient_row(id, "Ada Lovelace");
    row["email"] = json!(email);
    row["password_hash"] = json!(PasswordService::hash_password(password).unwrap());
    row
}

async fn mock_user_lookup(server: &MockServer, email: &str, rows: Value) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("email", format!("eq.{}", email)))
        .respond_with(ResponseTemplate::new(200).set_body_json(rows))
        .mount(server)
        .await;
}

async fn mock_last_login_update(server: &MockServer) {
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(server)
        .await;
}

fn signup_body(email: &str, password: &str) -> Value {
    json!({
        "name": "Ada Lovelace",
        "email": email,
        "password": password,
        "role": "patient",
        "location": "London"
    })
}

#[tokio::test]
async fn test_signup_creates_account_and_sets_cookie() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();

    mock_user_lookup(&mock_server, "ada@example.com", json!([])).await;
    let mut created = MockDbResponses::patient_row("user-1", "Ada Lovelace");
    created["email"] = json!("ada@example.com");
    Mock::given(method("POST"))
        .and(path("/rest/v1/users"))
        .and(body_partial_json(json!({ "email": "ada@example.com", "role": "patient", "experience": 0.0 })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([created])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = create_test_app(config);
    let response = app
        .oneshot(json_request("POST", "/signup", signup_body(" ADA@example.com ", "secret1")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap().to_string();
    assert!(cookie.starts_with("auth_session="));
    assert!(cookie.contains("HttpOnly"));

    let json_response = body_json(response).await;
    assert_eq!(json_response["success"], true);
    assert_eq!(json_response["message"], "Account created successfully");
    assert_eq!(json_response["data"]["user"]["id"], "user-1");
    assert!(json_response["data"]["user"].get("passwordHash").is_none());
    assert!(json_response["data"]["user"].get("password_hash").is_none());
    assert_eq!(json_response["data"]["token"].as_str().unwrap().split('.').count(), 3);
}

#[tokio::test]
async fn test_concurrent_signup_with_same_email_conflicts() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();

    // Lookup misses, but another signup commits the email before our insert.
    mock_user_lookup(&mock_server, "ada@example.com", json!([])).await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "23505",
            "message": "duplicate key value violates unique constraint \"users_email_key\""
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = create_test_app(config);
    let response = app
        .oneshot(json_request("POST", "/signup", signup_body("ada@example.com", "secret1")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json_response = body_json(response).await;
    assert_eq!(json_response["success"], false);
    assert_eq!(json_response["message"], "An account with this email already exists");
}

#[tokio::test]
async fn test_signup_validation_failure_is_unprocessable() {
    let config = TestConfig::default().to_app_config();
    let app = create_test_app(config);

    let response = app
        .oneshot(json_request("POST", "/signup", signup_body("ada@example.com", "123")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json_response = body_json(response).await;
    assert_eq!(json_response["success"], false);
    assert_eq!(json_response["message"], "Password must be at least 6 characters");
}

#[tokio::test]
async fn test_signup_with_existing_email_signs_in_when_password_matches() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();

    mock_user_lookup(
        &mock_server,
        "ada@example.com",
        json!([stored_patient("user-1", "ada@example.com", "secret1")]),
    )
    .await;
    mock_last_login_update(&mock_server).await;

    let app = create_test_app(config);
    let response = app
        .oneshot(json_request("POST", "/signup", signup_body("ada@example.com", "secret1")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json_response = body_json(response).await;
    assert_eq!(json_response["message"], "Signed in to existing account");
}

#[tokio::test]
async fn test_signup_with_existing_email_and_other_password_conflicts() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();

    mock_user_lookup(
        &mock_server,
        "ada@example.com",
        json!([stored_patient("user-1", "ada@example.com", "secret1")]),
    )
    .await;

    let app = create_test_app(config);
    let response = app
        .oneshot(json_request("POST", "/signup", signup_body("ada@example.com", "different")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_signin_success() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();

    mock_user_lookup(
        &mock_server,
        "ada@example.com",
        json!([stored_patient("user-1", "ada@example.com", "secret1")]),
    )
    .await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/users"))
        .and(query_param("id", "eq.user-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = create_test_app(config);
    let response = app
        .oneshot(json_request(
            "POST",
            "/signin",
            json!({ "email": "Ada@Example.com", "password": "secret1" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(SET_COOKIE).is_some());
    let json_response = body_json(response).await;
    assert_eq!(json_response["message"], "Login successful");
    assert_eq!(json_response["data"]["user"]["role"], "patient");
}

#[tokio::test]
async fn test_login_alias_reports_unknown_email() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();

    mock_user_lookup(&mock_server, "ghost@example.com", json!([])).await;

    let app = create_test_app(config);
    let response = app
        .oneshot(json_request(
            "POST",
            "/login",
            json!({ "email": "ghost@example.com", "password": "secret1" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json_response = body_json(response).await;
    assert_eq!(json_response["message"], "No user found with this email");
}

#[tokio::test]
async fn test_signin_wrong_password() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();

    mock_user_lookup(
        &mock_server,
        "ada@example.com",
        json!([stored_patient("user-1", "ada@example.com", "secret1")]),
    )
    .await;

    let app = create_test_app(config);
    let response = app
        .oneshot(json_request(
            "POST",
            "/signin",
            json!({ "email": "ada@example.com", "password": "wrong-one" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json_response = body_json(response).await;
    assert_eq!(json_response["message"], "Invalid password");
}

#[tokio::test]
async fn test_signin_missing_fields() {
    let app = create_test_app(TestConfig::default().to_app_config());

    let response = app
        .oneshot(json_request("POST", "/signin", json!({ "email": "ada@example.com" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_auto_signin_hides_unknown_email() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();

    mock_user_lookup(&mock_server, "ghost@example.com", json!([])).await;

    let app = create_test_app(config);
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auto-signin",
            json!({ "email": "ghost@example.com", "password": "secret1" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json_response = body_json(response).await;
    assert_eq!(json_response["message"], "Invalid credentials");

    let response = app
        .oneshot(json_request("POST", "/auto-signin", json!({ "password": "secret1" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_session_reports_cookie_user_or_null() {
    let config = TestConfig::default().to_app_config();
    let app = create_test_app(config.clone());

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/session").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["user"].is_null());

    let user = TestUser::doctor("doc@example.com");
    let token = JwtTestUtils::create_test_token(&user, &config.jwt_secret, Some(1));
    let response = app
        .oneshot(
            Request::builder()
                .uri("/session")
                .header("cookie", format!("auth_session={}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let json_response = body_json(response).await;
    assert_eq!(json_response["user"]["id"], user.id);
    assert_eq!(json_response["user"]["role"], "doctor");
}

#[tokio::test]
async fn test_verify_requires_session() {
    let app = create_test_app(TestConfig::default().to_app_config());

    let response = app
        .oneshot(Request::builder().uri("/verify").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_verify_rejects_expired_token() {
    let config = TestConfig::default().to_app_config();
    let app = create_test_app(config.clone());
    let token = JwtTestUtils::create_expired_token(&TestUser::default(), &config.jwt_secret);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/verify")
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_verify_returns_fresh_user() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();
    let user = TestUser::patient("ada@example.com");

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("id", format!("eq.{}", user.id)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([MockDbResponses::patient_row(&user.id, "Ada Renamed")])),
        )
        .mount(&mock_server)
        .await;

    let token = JwtTestUtils::create_test_token(&user, &config.jwt_secret, Some(1));
    let app = create_test_app(config);
    let response = app
        .oneshot(
            Request::builder()
                .uri("/verify")
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json_response = body_json(response).await;
    assert_eq!(json_response["data"]["user"]["name"], "Ada Renamed");
}

#[tokio::test]
async fn test_verify_missing_user_is_not_found() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();
    let user = TestUser::patient("gone@example.com");

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let token = JwtTestUtils::create_test_token(&user, &config.jwt_secret, Some(1));
    let app = create_test_app(config);
    let response = app
        .oneshot(
            Request::builder()
                .uri("/verify")
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_logout_expires_both_cookies() {
    let app = create_test_app(TestConfig::default().to_app_config());

    let response = app
        .oneshot(Request::builder().method("POST").uri("/logout").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookies: Vec<String> = response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect();
    assert_eq!(cookies.len(), 2);
    assert!(cookies.iter().all(|c| c.contains("Max-Age=0")));

    let json_response = body_json(response).await;
    assert_eq!(json_response["message"], "Logout successful");
}

#[tokio::test]
async fn test_status_counts_users() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();

    Mock::given(method("GET"))
        .and(path("/rest/v1/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("limit", "0"))
        .and(header("Prefer", "count=exact"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Range", "*/2")
                .set_body_json(json!([])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = create_test_app(config);
    let response = app
        .oneshot(Request::builder().uri("/status").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json_response = body_json(response).await;
    assert_eq!(json_response["message"], "Database connection successful");
    assert_eq!(json_response["data"]["userCount"], 2);
}

#[tokio::test]
async fn test_status_reports_store_outage() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let app = create_test_app(config);
    let response = app
        .oneshot(Request::builder().uri("/status").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
