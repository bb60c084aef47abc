use anyhow::Result;
use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::rest::eq;
use shared_database::DatabaseClient;

use crate::models::{SaveVisionAnalysisRequest, VisionAnalysisRecord};

const VISION_ANALYSES: &str = "vision_analyses";
pub const RECENT_ANALYSES_LIMIT: usize = 10;

pub struct VisionAnalysisStore {
    db: DatabaseClient,
}

impl VisionAnalysisStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            db: DatabaseClient::new(config),
        }
    }

    pub async fn recent(&self, user_id: &str) -> Result<Vec<VisionAnalysisRecord>> {
        debug!("Fetching saved vision analyses for {}", user_id);
        self.db
            .select(
                VISION_ANALYSES,
                &[
                    ("user_id", eq(user_id)),
                    ("order", "created_at.desc".to_string()),
                    ("limit", RECENT_ANALYSES_LIMIT.to_string()),
                ],
            )
            .await
    }

    pub async fn save(&self, user_id: &str, request: SaveVisionAnalysisRequest) -> Result<VisionAnalysisRecord> {
        let now = Utc::now();
        let record = VisionAnalysisRecord {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            image_url: request.image_url,
            analysis: request.analysis,
            confidence: request.confidence,
            recommendation: request.recommendation,
            category: request.category,
            created_at: now,
            updated_at: now,
        };

        let stored: VisionAnalysisRecord = self.db.insert(VISION_ANALYSES, &record).await?;
        info!("Saved vision analysis {} for {}", stored.id, user_id);
        Ok(stored)
    }
}
