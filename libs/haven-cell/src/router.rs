use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn haven_routes(state: Arc<AppConfig>) -> Router {
    let public_routes = Router::new()
        .route("/haven-chat", post(handlers::haven_chat))
        .route("/haven/emotion", post(handlers::analyze_emotion));

    let protected_routes = Router::new()
        .route(
            "/mental-health",
            get(handlers::get_wellbeing).post(handlers::record_check_in),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
