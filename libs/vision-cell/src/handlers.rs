use std::sync::Arc;

use axum::{
    extract::{Extension, Multipart, State},
    Json,
};
use serde_json::{json, Value};
use tracing::info;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_models::response::success;

use crate::models::{AnalysisReport, SaveVisionAnalysisRequest, VisionAnalysisView, VisionError};
use crate::services::{read_image_upload, ImageAnalysisService, ImageClassifier, VisionAnalysisStore};

pub async fn analyze_image(
    State(state): State<Arc<AppConfig>>,
    multipart: Multipart,
) -> Result<Json<AnalysisReport>, VisionError> {
    let upload = read_image_upload(multipart).await?;
    let report = ImageAnalysisService::new(&state).analyze(&upload).await?;

    info!("Image analysis complete via {} ({} finding(s))", report.source, report.results.len());
    Ok(Json(report))
}

pub async fn classify_image(
    State(state): State<Arc<AppConfig>>,
    multipart: Multipart,
) -> Result<Json<Value>, VisionError> {
    let upload = read_image_upload(multipart).await?;
    let (model, results) = ImageClassifier::new(&state).classify(&upload).await?;

    Ok(Json(json!({
        "success": true,
        "results": results,
        "modelUsed": model.name,
    })))
}

pub async fn list_vision_analyses(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let analyses: Vec<VisionAnalysisView> = VisionAnalysisStore::new(&state)
        .recent(&user.id)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?
        .into_iter()
        .map(VisionAnalysisView::from)
        .collect();

    Ok(Json(success(json!({ "analyses": analyses }))))
}

pub async fn save_vision_analysis(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(request): Json<SaveVisionAnalysisRequest>,
) -> Result<Json<Value>, AppError> {
    if !(0.0..=100.0).contains(&request.confidence) {
        return Err(AppError::ValidationError(
            "confidence must be between 0 and 100".to_string(),
        ));
    }

    let analysis = VisionAnalysisStore::new(&state)
        .save(&user.id, request)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(success(json!({ "analysis": VisionAnalysisView::from(analysis) }))))
}
