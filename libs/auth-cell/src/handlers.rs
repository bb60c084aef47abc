use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use shared_config::AppConfig;
use shared_database::rest::is_conflict;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_models::response::{success, success_with_message};
use shared_utils::cookies::{expired_session_cookies, session_cookie, set_cookie_headers};
use shared_utils::extractor::current_user;
use shared_utils::jwt::issue_token;

use crate::models::{Credentials, SignupRequest, UserRecord};
use crate::services::validation::{normalize_email, validate_signup};
use crate::services::{PasswordService, UserService};

fn database_error(err: anyhow::Error) -> AppError {
    error!("User store failure: {}", err);
    AppError::Database("Failed to reach user store".to_string())
}

fn password_matches(password: &str, hash: &str) -> Result<bool, AppError> {
    PasswordService::verify_password(password, hash).map_err(|e| {
        error!("Stored password hash is unreadable: {}", e);
        AppError::Internal("Failed to verify password".to_string())
    })
}

/// Issue a session for `user`: cookie plus `{user, token}` in the body.
fn session_response(
    config: &AppConfig,
    status: StatusCode,
    message: &str,
    user: &UserRecord,
) -> Result<Response, AppError> {
    let token = issue_token(&user.to_user(), &config.jwt_secret, config.session_ttl_hours)
        .map_err(AppError::Internal)?;

    let headers = set_cookie_headers([session_cookie(&token, config)]);
    let body = success_with_message(
        message,
        json!({
            "user": user.public_view(),
            "token": token,
        }),
    );

    Ok((status, headers, Json(body)).into_response())
}

pub async fn signup(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<SignupRequest>,
) -> Result<Response, AppError> {
    let form = validate_signup(&request).map_err(|msg| {
        warn!("Rejected signup: {}", msg);
        AppError::ValidationError(msg)
    })?;
    debug!("Signup for {}", form.email);

    let users = UserService::new(&state);

    if let Some(existing) = users.find_by_email(&form.email).await.map_err(database_error)? {
        if !password_matches(&form.password, &existing.password_hash)? {
            return Err(AppError::Conflict(
                "An account with this email already exists".to_string(),
            ));
        }

        let user = users.touch_last_login(existing).await.map_err(database_error)?;
        info!("Signup matched existing account {}", user.id);
        return session_response(&state, StatusCode::OK, "Signed in to existing account", &user);
    }

    let password_hash = PasswordService::hash_password(&form.password).map_err(|e| {
        error!("Password hashing failed: {}", e);
        AppError::Internal("Failed to create account".to_string())
    })?;

    let user = users.create(form, password_hash).await.map_err(|e| {
        if is_conflict(&e) {
            warn!("Signup lost a race for an existing email");
            AppError::Conflict("An account with this email already exists".to_string())
        } else {
            database_error(e)
        }
    })?;

    session_response(&state, StatusCode::CREATED, "Account created successfully", &user)
}

pub async fn signin(
    State(state): State<Arc<AppConfig>>,
    Json(credentials): Json<Credentials>,
) -> Result<Response, AppError> {
    let (email, password) = credentials.pair().ok_or_else(|| {
        AppError::ValidationError("Email and password are required".to_string())
    })?;
    let email = normalize_email(email);
    debug!("Signin for {}", email);

    let users = UserService::new(&state);
    let user = users
        .find_by_email(&email)
        .await
        .map_err(database_error)?
        .ok_or_else(|| AppError::NotFound("No user found with this email".to_string()))?;

    if !password_matches(password, &user.password_hash)? {
        warn!("Invalid password for {}", user.id);
        return Err(AppError::Auth("Invalid password".to_string()));
    }

    let user = users.touch_last_login(user).await.map_err(database_error)?;
    session_response(&state, StatusCode::OK, "Login successful", &user)
}

/// Silent re-sign-in. Unknown email and wrong password look the same.
pub async fn auto_signin(
    State(state): State<Arc<AppConfig>>,
    Json(credentials): Json<Credentials>,
) -> Result<Response, AppError> {
    let (email, password) = credentials
        .pair()
        .ok_or_else(|| AppError::BadRequest("Email and password are required".to_string()))?;
    let email = normalize_email(email);

    let users = UserService::new(&state);
    let invalid = || AppError::Auth("Invalid credentials".to_string());

    let user = users
        .find_by_email(&email)
        .await
        .map_err(database_error)?
        .ok_or_else(invalid)?;

    if !password_matches(password, &user.password_hash)? {
        return Err(invalid());
    }

    let user = users.touch_last_login(user).await.map_err(database_error)?;
    session_response(&state, StatusCode::OK, "Auto sign-in successful", &user)
}

pub async fn session(State(state): State<Arc<AppConfig>>, headers: HeaderMap) -> Json<Value> {
    let user = current_user(&headers, &state).ok();
    Json(json!({ "user": user }))
}

pub async fn verify(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    debug!("Verifying session for {}", user.id);

    let record = UserService::new(&state)
        .find_by_id(&user.id)
        .await
        .map_err(database_error)?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(success(json!({ "user": record.public_view() }))))
}

pub async fn logout() -> Response {
    let headers = set_cookie_headers(expired_session_cookies());
    let body = json!({
        "success": true,
        "message": "Logout successful",
    });

    (headers, Json(body)).into_response()
}

pub async fn status(State(state): State<Arc<AppConfig>>) -> Result<Json<Value>, AppError> {
    let users = UserService::new(&state);

    let unavailable = |e: anyhow::Error| {
        error!("Database health check failed: {}", e);
        AppError::Database("Database connection failed".to_string())
    };

    users.ping().await.map_err(unavailable)?;
    let user_count = users.count().await.map_err(unavailable)?;

    Ok(Json(success_with_message(
        "Database connection successful",
        json!({
            "userCount": user_count,
            "timestamp": Utc::now(),
        }),
    )))
}
