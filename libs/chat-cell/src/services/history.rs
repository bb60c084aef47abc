use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::rest::eq;
use shared_database::DatabaseClient;

use crate::models::{ChatSessionRecord, SaveChatSessionRequest};

const CHAT_SESSIONS: &str = "chat_sessions";
pub const RECENT_SESSIONS_LIMIT: usize = 10;

pub struct ChatHistoryService {
    db: DatabaseClient,
}

impl ChatHistoryService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            db: DatabaseClient::new(config),
        }
    }

    pub async fn recent(&self, user_id: &str) -> Result<Vec<ChatSessionRecord>> {
        debug!("Fetching recent chat sessions for {}", user_id);
        self.db
            .select(
                CHAT_SESSIONS,
                &[
                    ("user_id", eq(user_id)),
                    ("order", "created_at.desc".to_string()),
                    ("limit", RECENT_SESSIONS_LIMIT.to_string()),
                ],
            )
            .await
    }

    /// Sessions created at or after `since`.
    pub async fn since(&self, user_id: &str, since: DateTime<Utc>) -> Result<Vec<ChatSessionRecord>> {
        self.db
            .select(
                CHAT_SESSIONS,
                &[
                    ("user_id", eq(user_id)),
                    ("created_at", format!("gte.{}", since.to_rfc3339())),
                    ("order", "created_at.desc".to_string()),
                ],
            )
            .await
    }

    pub async fn save(&self, user_id: &str, request: SaveChatSessionRequest) -> Result<ChatSessionRecord> {
        let now = Utc::now();
        let record = ChatSessionRecord {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            symptoms: request.symptoms,
            category: Some(request.category),
            severity: Some(request.severity),
            summary: request.summary,
            recommendations: request.recommendations,
            source: request.source,
            messages_count: request.messages_count,
            visit_duration_ms: request.visit_duration_ms,
            visit_id: request.visit_id,
            created_at: now,
            updated_at: now,
        };

        let stored: ChatSessionRecord = self.db.insert(CHAT_SESSIONS, &record).await?;
        info!("Saved chat session {} for {}", stored.id, user_id);
        Ok(stored)
    }
}
