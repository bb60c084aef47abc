use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    Json,
};
use serde_json::{json, Value};
use tracing::{debug, error};

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_models::response::success;

use crate::models::{ChatRequest, ChatSessionView, SaveChatSessionRequest, TriageRequest};
use crate::services::{parse_contents, triage, AssistantService, ChatHistoryService};

pub async fn chat(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<Value>, AppError> {
    let contents = parse_contents(&request.contents)?;

    let reply = AssistantService::new(&state)
        .reply(&contents)
        .await
        .map_err(|e| {
            error!("Gemini Error: {}", e);
            AppError::Internal("Gemini API error".to_string())
        })?;

    Ok(Json(json!({ "response": reply })))
}

pub async fn triage_message(Json(request): Json<TriageRequest>) -> Json<Value> {
    let report = triage(&request.text, request.previous_score);
    debug!("Triage: {} symptom(s), severity {}", report.symptoms.len(), report.severity);
    Json(json!(report))
}

pub async fn list_chat_history(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let sessions: Vec<ChatSessionView> = ChatHistoryService::new(&state)
        .recent(&user.id)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?
        .into_iter()
        .map(ChatSessionView::from)
        .collect();

    Ok(Json(success(json!({ "sessions": sessions }))))
}

pub async fn save_chat_history(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(request): Json<SaveChatSessionRequest>,
) -> Result<Json<Value>, AppError> {
    if request.category.trim().is_empty() {
        return Err(AppError::ValidationError("category is required".to_string()));
    }

    let session = ChatHistoryService::new(&state)
        .save(&user.id, request)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(success(json!({ "session": ChatSessionView::from(session) }))))
}
