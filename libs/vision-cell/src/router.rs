use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::services::MAX_UPLOAD_BODY_BYTES;

pub fn vision_routes(state: Arc<AppConfig>) -> Router {
    let upload_routes = Router::new()
        .route("/analyze-image", post(handlers::analyze_image))
        .route("/classify-image", post(handlers::classify_image))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY_BYTES));

    let protected_routes = Router::new()
        .route(
            "/vision-analysis",
            get(handlers::list_vision_analyses).post(handlers::save_vision_analysis),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(upload_routes)
        .merge(protected_routes)
        .with_state(state)
}
