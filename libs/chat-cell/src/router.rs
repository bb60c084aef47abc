use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn chat_routes(state: Arc<AppConfig>) -> Router {
    let public_routes = Router::new()
        .route("/chat", post(handlers::chat))
        .route("/chat/triage", post(handlers::triage_message));

    let protected_routes = Router::new()
        .route(
            "/chat-history",
            get(handlers::list_chat_history).post(handlers::save_chat_history),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
