use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use doctor_cell::Specialization;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Mild => write!(f, "Mild"),
            Severity::Moderate => write!(f, "Moderate"),
            Severity::Severe => write!(f, "Severe"),
        }
    }
}

/// Body of `POST /chat`. `contents` stays untyped until validated.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub contents: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriageRequest {
    #[serde(default)]
    pub text: String,
    /// Score accumulated over earlier turns of the same conversation.
    #[serde(default)]
    pub previous_score: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriageReport {
    pub symptoms: Vec<String>,
    pub severity_delta: i32,
    pub score: i32,
    pub severity: Severity,
    pub specialization: Option<Specialization>,
}

// ==============================================================================
// CHAT HISTORY
// ==============================================================================

/// A row of the `chat_sessions` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSessionRecord {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub severity: Option<Severity>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub messages_count: Option<u32>,
    #[serde(default)]
    pub visit_duration_ms: Option<u64>,
    #[serde(default)]
    pub visit_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveChatSessionRequest {
    #[serde(default)]
    pub symptoms: Vec<String>,
    pub category: String,
    pub severity: Severity,
    pub summary: Option<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    pub source: Option<String>,
    pub messages_count: Option<u32>,
    pub visit_duration_ms: Option<u64>,
    pub visit_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSessionView {
    pub id: String,
    pub symptoms: Vec<String>,
    pub category: Option<String>,
    pub severity: Option<Severity>,
    pub summary: Option<String>,
    pub recommendations: Vec<String>,
    pub source: Option<String>,
    pub messages_count: Option<u32>,
    pub visit_duration_ms: Option<u64>,
    pub visit_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ChatSessionRecord> for ChatSessionView {
    fn from(r: ChatSessionRecord) -> Self {
        Self {
            id: r.id,
            symptoms: r.symptoms,
            category: r.category,
            severity: r.severity,
            summary: r.summary,
            recommendations: r.recommendations,
            source: r.source,
            messages_count: r.messages_count,
            visit_duration_ms: r.visit_duration_ms,
            visit_id: r.visit_id,
            created_at: r.created_at,
        }
    }
}
