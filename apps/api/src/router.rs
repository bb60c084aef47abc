use std::sync::Arc;

use axum::{routing::get, Router};

use appointment_cell::router::{doctor_appointment_routes, patient_appointment_routes};
use auth_cell::router::auth_routes;
use chat_cell::router::chat_routes;
use doctor_cell::router::doctor_routes;
use haven_cell::router::haven_routes;
use shared_config::AppConfig;
use vision_cell::router::vision_routes;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    let api = Router::new()
        .nest("/auth", auth_routes(state.clone()))
        .nest("/doctors", doctor_routes(state.clone()))
        .nest("/appointments", patient_appointment_routes(state.clone()))
        .nest("/doctor/appointments", doctor_appointment_routes(state.clone()))
        .merge(chat_routes(state.clone()))
        .merge(haven_routes(state.clone()))
        .merge(vision_routes(state));

    Router::new()
        .route("/", get(|| async { "Synaptix Health API is running!" }))
        .nest("/api", api)
}
