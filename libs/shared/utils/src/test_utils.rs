use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::{Role, User};

use crate::jwt::issue_token;

pub struct TestConfig {
    pub jwt_secret: String,
    pub database_url: String,
    pub database_service_key: String,
    pub gemini_api_key: String,
    pub gemini_base_url: String,
    pub huggingface_api_key: String,
    pub huggingface_base_url: String,
    pub overpass_url: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            database_url: "http://localhost:54321".to_string(),
            database_service_key: "test-service-key".to_string(),
            gemini_api_key: "test-gemini-key".to_string(),
            gemini_base_url: "http://localhost:54322".to_string(),
            huggingface_api_key: "test-hf-key".to_string(),
            huggingface_base_url: "http://localhost:54323".to_string(),
            overpass_url: "http://localhost:54324/api/interpreter".to_string(),
        }
    }
}

impl TestConfig {
    /// Point the store and every upstream API at one mock server. Paths do not overlap:
    /// `/rest/v1/*`, `/models/*`, `/hf/*` and `/api/interpreter`.
    pub fn with_mock_server(uri: &str) -> Self {
        Self {
            database_url: uri.to_string(),
            gemini_base_url: uri.to_string(),
            huggingface_base_url: format!("{}/hf", uri),
            overpass_url: format!("{}/api/interpreter", uri),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            database_url: self.database_url.clone(),
            database_service_key: self.database_service_key.clone(),
            jwt_secret: self.jwt_secret.clone(),
            session_ttl_hours: 24,
            secure_cookies: false,
            gemini_api_key: self.gemini_api_key.clone(),
            gemini_base_url: self.gemini_base_url.clone(),
            gemini_chat_model: "gemini-2.5-flash".to_string(),
            gemini_vision_model: "gemini-1.5-flash".to_string(),
            huggingface_api_key: self.huggingface_api_key.clone(),
            huggingface_base_url: self.huggingface_base_url.clone(),
            overpass_url: self.overpass_url.clone(),
            port: 0,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Option<Role>,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            name: "Test User".to_string(),
            role: Some(Role::Patient),
        }
    }
}

impl TestUser {
    pub fn new(email: &str, role: Option<Role>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            name: email.split('@').next().unwrap_or("user").to_string(),
            role,
        }
    }

    pub fn doctor(email: &str) -> Self {
        Self::new(email, Some(Role::Doctor))
    }

    pub fn patient(email: &str) -> Self {
        Self::new(email, Some(Role::Patient))
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role,
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        issue_token(&user.to_user(), secret, exp_hours.unwrap_or(24))
            .expect("test secret must be non-empty")
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

pub struct MockDbResponses;

impl MockDbResponses {
    pub fn doctor_row(id: &str, name: &str, specialization: &str) -> serde_json::Value {
        json!({
            "id": id,
            "name": name,
            "email": format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            "password_hash": "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHQ$aGFzaA",
            "role": "doctor",
            "location": "Springfield",
            "specialization": specialization,
            "experience": 12,
            "achievements": ["Board Certified"],
            "profile_picture": null,
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339()
        })
    }

    pub fn patient_row(id: &str, name: &str) -> serde_json::Value {
        json!({
            "id": id,
            "name": name,
            "email": format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            "password_hash": "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHQ$aGFzaA",
            "role": "patient",
            "location": "Springfield",
            "specialization": null,
            "experience": 0,
            "achievements": [],
            "profile_picture": null,
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339()
        })
    }

    pub fn appointment_row(id: &str, patient_id: &str, doctor_id: &str, status: &str) -> serde_json::Value {
        let now = Utc::now();
        json!({
            "id": id,
            "patient_id": patient_id,
            "doctor_id": doctor_id,
            "requested_at": now.to_rfc3339(),
            "deadline": (now + chrono::Duration::days(3)).to_rfc3339(),
            "status": status,
            "scheduled_at": null,
            "notes": "Recurring headaches",
            "created_at": now.to_rfc3339(),
            "updated_at": now.to_rfc3339()
        })
    }

    /// Gemini `generateContent` body whose candidate text is `text`.
    pub fn gemini_reply(text: &str) -> serde_json::Value {
        json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] },
                "finishReason": "STOP"
            }]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = TestConfig::default();
        let app_config = config.to_app_config();

        assert_eq!(app_config.database_url, "http://localhost:54321");
        assert!(!app_config.jwt_secret.is_empty());
        assert!(app_config.is_configured());
    }

    #[test]
    fn test_mock_server_config_shares_uri() {
        let config = TestConfig::with_mock_server("http://127.0.0.1:9999").to_app_config();
        assert_eq!(config.database_url, "http://127.0.0.1:9999");
        assert_eq!(config.gemini_base_url, "http://127.0.0.1:9999");
        assert_eq!(config.huggingface_base_url, "http://127.0.0.1:9999/hf");
    }

    #[test]
    fn test_user_creation() {
        let user = TestUser::doctor("doc@example.com");
        assert_eq!(user.email, "doc@example.com");
        assert_eq!(user.name, "doc");

        let user_model = user.to_user();
        assert!(user_model.is_doctor());
        assert_eq!(user_model.id, user.id);
    }

    #[test]
    fn test_jwt_token_creation() {
        let user = TestUser::default();
        let token = JwtTestUtils::create_test_token(&user, "test-secret", Some(1));

        assert_eq!(token.split('.').count(), 3);
    }
}
