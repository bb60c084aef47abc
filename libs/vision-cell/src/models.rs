use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use shared_ai::Classification;
use shared_models::error::AppError;

/// A validated image upload plus the form fields sent with it.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub file_name: String,
    pub model: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    pub detected_type: &'static str,
    pub confidence: u32,
    pub reasoning: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisSource {
    GeminiVision,
    Basic,
}

impl AnalysisSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisSource::GeminiVision => "Gemini AI Vision Analysis",
            AnalysisSource::Basic => "Basic Medical Assessment",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub success: bool,
    pub results: Vec<Classification>,
    pub model_used: &'static str,
    pub explanation: String,
    pub suggestions: String,
    pub disclaimer: &'static str,
    pub source: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detection_confidence: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detection_reasoning: Option<String>,
}

// ==============================================================================
// SAVED ANALYSES
// ==============================================================================

/// A row of the `vision_analyses` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionAnalysisRecord {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub analysis: String,
    pub confidence: f64,
    pub recommendation: String,
    #[serde(default)]
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveVisionAnalysisRequest {
    pub image_url: Option<String>,
    pub analysis: String,
    pub confidence: f64,
    pub recommendation: String,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisionAnalysisView {
    pub id: String,
    pub image_url: Option<String>,
    pub analysis: String,
    pub confidence: f64,
    pub recommendation: String,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<VisionAnalysisRecord> for VisionAnalysisView {
    fn from(r: VisionAnalysisRecord) -> Self {
        Self {
            id: r.id,
            image_url: r.image_url,
            analysis: r.analysis,
            confidence: r.confidence,
            recommendation: r.recommendation,
            category: r.category,
            created_at: r.created_at,
        }
    }
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Error, Debug)]
pub enum VisionError {
    #[error("No image file provided")]
    NoImage,

    #[error("File must be an image")]
    NotAnImage,

    #[error("Image too large. Maximum size is 10MB")]
    TooLarge,

    #[error("Invalid model specified")]
    InvalidModel,

    #[error("{0}")]
    MalformedUpload(String),

    /// Non-2xx from the inference API; the status is passed through.
    #[error("{message}")]
    Upstream { status: StatusCode, message: String },

    #[error("{0}")]
    Analysis(String),
}

impl From<VisionError> for AppError {
    fn from(err: VisionError) -> Self {
        match err {
            VisionError::NoImage
            | VisionError::NotAnImage
            | VisionError::TooLarge
            | VisionError::InvalidModel
            | VisionError::MalformedUpload(_) => AppError::BadRequest(err.to_string()),
            VisionError::Upstream { .. } => AppError::ExternalService(err.to_string()),
            VisionError::Analysis(msg) => AppError::Internal(msg),
        }
    }
}

impl IntoResponse for VisionError {
    fn into_response(self) -> Response {
        match self {
            VisionError::Upstream { status, message } => {
                tracing::error!("Error: {}: {}", status, message);
                let body = Json(json!({
                    "success": false,
                    "message": message,
                    "error": message,
                }));
                (status, body).into_response()
            }
            other => AppError::from(other).into_response(),
        }
    }
}
