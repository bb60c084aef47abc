use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::router::{doctor_appointment_routes, patient_appointment_routes};
use shared_config::AppConfig;
use shared_utils::test_utils::{JwtTestUtils, MockDbResponses, TestConfig, TestUser};

fn patient_app(config: AppConfig) -> Router {
    patient_appointment_routes(Arc::new(config))
}

fn doctor_app(config: AppConfig) -> Router {
    doctor_appointment_routes(Arc::new(config))
}

fn authed(method: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri("/")
        .header("authorization", format!("Bearer {}", token));

    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn body_json(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn mock_stored_role(server: &MockServer, user_id: &str, role: &str) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("select", "role"))
        .and(query_param("id", format!("eq.{}", user_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "role": role }])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_requires_session() {
    let app = patient_app(TestConfig::default().to_app_config());

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_patient_listing_joins_doctors_and_drops_orphans() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();
    let patient = TestUser::patient("pat@example.com");

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("patient_id", format!("eq.{}", patient.id)))
        .and(query_param("order", "created_at.desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockDbResponses::appointment_row("appt-1", &patient.id, "doc-1", "pending"),
            MockDbResponses::appointment_row("appt-2", &patient.id, "doc-gone", "approved"),
        ])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("id", "in.(doc-1,doc-gone)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockDbResponses::doctor_row("doc-1", "Dr Bones", "Orthopedist"),
        ])))
        .mount(&mock_server)
        .await;

    let token = JwtTestUtils::create_test_token(&patient, &config.jwt_secret, Some(1));
    let response = patient_app(config).oneshot(authed("GET", &token, None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json_response = body_json(response).await;
    let appointments = json_response["data"]["appointments"].as_array().unwrap();
    assert_eq!(appointments.len(), 1);
    assert_eq!(appointments[0]["_id"], "appt-1");
    assert_eq!(appointments[0]["status"], "pending");
    assert_eq!(appointments[0]["doctor"]["name"], "Dr Bones");
    assert_eq!(appointments[0]["doctor"]["specialization"], "Orthopedist");
}

#[tokio::test]
async fn test_doctor_session_cannot_use_patient_routes() {
    let config = TestConfig::default().to_app_config();
    let doctor = TestUser::doctor("doc@example.com");
    let token = JwtTestUtils::create_test_token(&doctor, &config.jwt_secret, Some(1));

    let response = patient_app(config).oneshot(authed("GET", &token, None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_create_appointment() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();
    let patient = TestUser::patient("pat@example.com");

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("id", "eq.doc-1"))
        .and(query_param("role", "eq.doctor"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockDbResponses::doctor_row("doc-1", "Dr Bones", "Orthopedist"),
        ])))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .and(body_partial_json(json!({
            "patient_id": patient.id,
            "doctor_id": "doc-1",
            "status": "pending",
            "scheduled_at": null
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockDbResponses::appointment_row("appt-9", &patient.id, "doc-1", "pending"),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let token = JwtTestUtils::create_test_token(&patient, &config.jwt_secret, Some(1));
    let body = json!({
        "doctorId": "doc-1",
        "deadline": (Utc::now() + Duration::days(3)).to_rfc3339(),
        "notes": "Knee pain after a fall"
    });
    let response = patient_app(config)
        .oneshot(authed("POST", &token, Some(body)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let json_response = body_json(response).await;
    assert_eq!(json_response["data"]["appointment"]["id"], "appt-9");
    assert_eq!(json_response["data"]["appointment"]["doctorId"], "doc-1");
}

#[tokio::test]
async fn test_create_appointment_rejects_past_deadline() {
    let config = TestConfig::default().to_app_config();
    let patient = TestUser::patient("pat@example.com");
    let token = JwtTestUtils::create_test_token(&patient, &config.jwt_secret, Some(1));

    let body = json!({
        "doctorId": "doc-1",
        "deadline": (Utc::now() - Duration::days(1)).to_rfc3339()
    });
    let response = patient_app(config)
        .oneshot(authed("POST", &token, Some(body)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_create_appointment_requires_fields() {
    let config = TestConfig::default().to_app_config();
    let patient = TestUser::patient("pat@example.com");
    let token = JwtTestUtils::create_test_token(&patient, &config.jwt_secret, Some(1));

    let response = patient_app(config)
        .oneshot(authed("POST", &token, Some(json!({ "notes": "hi" }))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_create_appointment_with_unknown_doctor() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();
    let patient = TestUser::patient("pat@example.com");

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let token = JwtTestUtils::create_test_token(&patient, &config.jwt_secret, Some(1));
    let body = json!({
        "doctorId": "nobody",
        "deadline": (Utc::now() + Duration::days(1)).to_rfc3339()
    });
    let response = patient_app(config)
        .oneshot(authed("POST", &token, Some(body)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_doctor_routes_check_stored_role() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();
    // The token says doctor but the account has since changed.
    let user = TestUser::doctor("former@example.com");
    mock_stored_role(&mock_server, &user.id, "patient").await;

    let token = JwtTestUtils::create_test_token(&user, &config.jwt_secret, Some(1));
    let response = doctor_app(config).oneshot(authed("GET", &token, None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_doctor_listing_joins_patients() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();
    let doctor = TestUser::doctor("doc@example.com");
    mock_stored_role(&mock_server, &doctor.id, "doctor").await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("doctor_id", format!("eq.{}", doctor.id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockDbResponses::appointment_row("appt-1", "pat-1", &doctor.id, "pending"),
        ])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("select", "id,name,email"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "pat-1", "name": "Pat Smith", "email": "pat@example.com" }
        ])))
        .mount(&mock_server)
        .await;

    let token = JwtTestUtils::create_test_token(&doctor, &config.jwt_secret, Some(1));
    let response = doctor_app(config).oneshot(authed("GET", &token, None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json_response = body_json(response).await;
    assert_eq!(json_response["data"]["appointments"][0]["patient"]["name"], "Pat Smith");
    assert_eq!(json_response["data"]["appointments"][0]["notes"], "Recurring headaches");
}

#[tokio::test]
async fn test_doctor_approves_pending_appointment() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();
    let doctor = TestUser::doctor("doc@example.com");
    mock_stored_role(&mock_server, &doctor.id, "doctor").await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", "eq.appt-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockDbResponses::appointment_row("appt-1", "pat-1", &doctor.id, "pending"),
        ])))
        .mount(&mock_server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("status", "eq.pending"))
        .and(body_partial_json(json!({
            "status": "approved",
            "scheduled_at": "2030-05-01T10:00:00Z"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": "appt-1" }])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let token = JwtTestUtils::create_test_token(&doctor, &config.jwt_secret, Some(1));
    let body = json!({
        "appointmentId": "appt-1",
        "action": "approve",
        "scheduledAt": "2030-05-01T10:00:00Z"
    });
    let response = doctor_app(config)
        .oneshot(authed("PATCH", &token, Some(body)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "success": true }));
}

#[tokio::test]
async fn test_deciding_twice_conflicts() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();
    let doctor = TestUser::doctor("doc@example.com");
    mock_stored_role(&mock_server, &doctor.id, "doctor").await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockDbResponses::appointment_row("appt-1", "pat-1", &doctor.id, "rejected"),
        ])))
        .mount(&mock_server)
        .await;

    let token = JwtTestUtils::create_test_token(&doctor, &config.jwt_secret, Some(1));
    let body = json!({ "appointmentId": "appt-1", "action": "reject" });
    let response = doctor_app(config)
        .oneshot(authed("PATCH", &token, Some(body)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_decision_lost_to_concurrent_update_conflicts() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();
    let doctor = TestUser::doctor("doc@example.com");
    mock_stored_role(&mock_server, &doctor.id, "doctor").await;

    // First read sees it pending; the re-read after the guarded PATCH sees the other decision.
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", "eq.appt-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockDbResponses::appointment_row("appt-1", "pat-1", &doctor.id, "pending"),
        ])))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", "eq.appt-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockDbResponses::appointment_row("appt-1", "pat-1", &doctor.id, "approved"),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("status", "eq.pending"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let token = JwtTestUtils::create_test_token(&doctor, &config.jwt_secret, Some(1));
    let body = json!({ "appointmentId": "appt-1", "action": "reject" });
    let response = doctor_app(config)
        .oneshot(authed("PATCH", &token, Some(body)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_cannot_decide_another_doctors_appointment() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();
    let doctor = TestUser::doctor("doc@example.com");
    mock_stored_role(&mock_server, &doctor.id, "doctor").await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockDbResponses::appointment_row("appt-1", "pat-1", "someone-else", "pending"),
        ])))
        .mount(&mock_server)
        .await;

    let token = JwtTestUtils::create_test_token(&doctor, &config.jwt_secret, Some(1));
    let body = json!({ "appointmentId": "appt-1", "action": "reject" });
    let response = doctor_app(config)
        .oneshot(authed("PATCH", &token, Some(body)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_approve_without_time_is_unprocessable() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();
    let doctor = TestUser::doctor("doc@example.com");
    mock_stored_role(&mock_server, &doctor.id, "doctor").await;

    let token = JwtTestUtils::create_test_token(&doctor, &config.jwt_secret, Some(1));
    let body = json!({ "appointmentId": "appt-1", "action": "approve" });
    let response = doctor_app(config)
        .oneshot(authed("PATCH", &token, Some(body)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
