use std::sync::Arc;

use axum::{routing::get, Router};

use shared_config::AppConfig;

use crate::handlers;

pub fn doctor_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(handlers::list_doctors))
        .route("/recommendations", get(handlers::recommend_doctors))
        .route("/clinics/nearby", get(handlers::nearby_clinics))
        .with_state(state)
}
