use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::cookies::session_token_from_cookies;
use crate::jwt::validate_token;

/// Session token from `Authorization: Bearer ...`, falling back to the session cookie.
pub fn session_token(headers: &HeaderMap) -> Result<String, AppError> {
    if let Some(auth_header) = headers.get("Authorization") {
        let auth_value = auth_header
            .to_str()
            .map_err(|_| AppError::Auth("Invalid authorization header format".to_string()))?;

        return match auth_value.strip_prefix("Bearer ") {
            Some(token) if !token.is_empty() => Ok(token.to_string()),
            _ => Err(AppError::Auth("Invalid authorization header format".to_string())),
        };
    }

    session_token_from_cookies(headers).ok_or_else(|| AppError::Auth("Unauthorized".to_string()))
}

/// Resolve the caller from request headers, if a valid session is present.
pub fn current_user(headers: &HeaderMap, config: &AppConfig) -> Result<User, AppError> {
    let token = session_token(headers)?;
    validate_token(&token, &config.jwt_secret).map_err(AppError::Auth)
}

// Middleware for authenticated routes
pub async fn auth_middleware(
    State(config): State<Arc<AppConfig>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let user = current_user(request.headers(), &config)?;

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}
