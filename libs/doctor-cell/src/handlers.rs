use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::{json, Value};
use tracing::{debug, error, warn};

use shared_config::AppConfig;
use shared_models::error::AppError;
use shared_models::response::success;

use crate::models::{DoctorListQuery, NearbyClinicsQuery, PublicDoctorProfile, RecommendationQuery};
use crate::services::{ClinicLocator, DoctorDirectory, RecommendationService};

fn database_error(err: anyhow::Error) -> AppError {
    error!("Doctor lookup failed: {}", err);
    AppError::Database("Failed to fetch doctors".to_string())
}

// ==============================================================================
// PUBLIC HANDLERS (NO AUTHENTICATION REQUIRED)
// ==============================================================================

pub async fn list_doctors(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<DoctorListQuery>,
) -> Result<Json<Value>, AppError> {
    let doctors: Vec<PublicDoctorProfile> = DoctorDirectory::new(&state)
        .list(query.specialization.as_deref())
        .await
        .map_err(database_error)?
        .into_iter()
        .map(PublicDoctorProfile::from)
        .collect();

    debug!("Found {} doctors", doctors.len());
    Ok(Json(success(json!({ "doctors": doctors }))))
}

pub async fn recommend_doctors(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<RecommendationQuery>,
) -> Result<Json<Value>, AppError> {
    let text = query.text.unwrap_or_default();

    let recommendation = RecommendationService::new(&state)
        .recommend(&text)
        .await
        .map_err(database_error)?;

    let doctors: Vec<PublicDoctorProfile> = recommendation
        .doctors
        .into_iter()
        .map(PublicDoctorProfile::from)
        .collect();

    Ok(Json(success(json!({
        "specialization": recommendation.specialization,
        "doctors": doctors,
    }))))
}

pub async fn nearby_clinics(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<NearbyClinicsQuery>,
) -> Result<Json<Value>, AppError> {
    let (lat, lon) = match (query.lat, query.lon) {
        (Some(lat), Some(lon)) if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon) => {
            (lat, lon)
        }
        _ => {
            warn!("Rejected clinic search at {:?},{:?}", query.lat, query.lon);
            return Err(AppError::ValidationError(
                "lat must be within [-90, 90] and lon within [-180, 180]".to_string(),
            ));
        }
    };

    let clinics = ClinicLocator::new(&state)
        .nearby(lat, lon)
        .await
        .map_err(|e| AppError::ExternalService(e.to_string()))?;

    Ok(Json(success(json!({ "clinics": clinics }))))
}
