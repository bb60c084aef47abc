use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    Json,
};
use serde_json::{json, Value};
use tracing::{debug, error, warn};

use chat_cell::parse_contents;
use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_models::response::success;

use crate::models::{EmotionRequest, HavenChatRequest, MentalHealthCheckIn};
use crate::services::emotion::DEFAULT_CALIBRATION_FRAMES;
use crate::services::{CompanionService, EmotionAnalyzer, MentalHealthRecordService, WellbeingService};

/// Longest frame accepted by the emotion endpoint. Pitch estimation is quadratic in frame length.
const MAX_FRAME_SAMPLES: usize = 4096;

pub async fn haven_chat(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<HavenChatRequest>,
) -> Result<Json<Value>, AppError> {
    let companion = CompanionService::new(&state);
    if !companion.is_configured() {
        warn!("Haven chat requested without a Gemini key");
        return Err(AppError::Internal("GEMINI_API_KEY is not configured.".to_string()));
    }

    let contents = parse_contents(&request.contents)?;

    let reply = companion
        .reply(&contents, request.emotion.as_deref())
        .await
        .map_err(|e| {
            error!("Haven Gemini Error: {}", e);
            AppError::Internal("Haven chat API error".to_string())
        })?;

    Ok(Json(json!({ "response": reply })))
}

pub async fn analyze_emotion(Json(request): Json<EmotionRequest>) -> Result<Json<Value>, AppError> {
    if request.sample_rate <= 0.0 {
        return Err(AppError::ValidationError("sampleRate must be positive".to_string()));
    }
    if request.frames.is_empty() {
        return Err(AppError::ValidationError("At least one audio frame is required".to_string()));
    }
    if request.frames.iter().any(|f| f.len() > MAX_FRAME_SAMPLES) {
        return Err(AppError::ValidationError(format!(
            "Frames may hold at most {} samples",
            MAX_FRAME_SAMPLES
        )));
    }

    let calibration = request.calibration_frames.unwrap_or(DEFAULT_CALIBRATION_FRAMES);
    let report = EmotionAnalyzer::analyze(&request.frames, request.sample_rate, calibration);
    debug!(
        "Emotion over {} frame(s): {} (calibrated: {})",
        report.frames_analyzed, report.emotion, report.calibrated
    );

    Ok(Json(json!(report)))
}

pub async fn get_wellbeing(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let metrics = WellbeingService::new(&state)
        .weekly(&user.id)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(success(metrics)))
}

pub async fn record_check_in(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(check_in): Json<MentalHealthCheckIn>,
) -> Result<Json<Value>, AppError> {
    if let Some(field) = check_in.out_of_range() {
        return Err(AppError::ValidationError(format!("{} must be between 0 and 100", field)));
    }

    let record = MentalHealthRecordService::new(&state)
        .record(&user.id, check_in)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(success(json!({ "record": record }))))
}
