use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn auth_routes(state: Arc<AppConfig>) -> Router {
    let public_routes = Router::new()
        .route("/signup", post(handlers::signup))
        .route("/signin", post(handlers::signin))
        .route("/login", post(handlers::signin))
        .route("/auto-signin", post(handlers::auto_signin))
        .route("/session", get(handlers::session))
        .route("/logout", post(handlers::logout))
        .route("/status", get(handlers::status));

    let protected_routes = Router::new()
        .route("/verify", get(handlers::verify))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
