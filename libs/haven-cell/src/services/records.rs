use anyhow::Result;
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::DatabaseClient;

use crate::models::{MentalHealthCheckIn, MentalHealthRecord};

const MENTAL_HEALTH_RECORDS: &str = "mental_health_records";

pub struct MentalHealthRecordService {
    db: DatabaseClient,
}

impl MentalHealthRecordService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            db: DatabaseClient::new(config),
        }
    }

    pub async fn record(&self, user_id: &str, check_in: MentalHealthCheckIn) -> Result<MentalHealthRecord> {
        let now = Utc::now();
        let record = MentalHealthRecord {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            mood: check_in.mood,
            stress: check_in.stress,
            anxiety: check_in.anxiety,
            sleep: check_in.sleep,
            notes: check_in.notes,
            recorded_at: now,
            created_at: now,
        };

        let stored: MentalHealthRecord = self.db.insert(MENTAL_HEALTH_RECORDS, &record).await?;
        info!("Stored mental health check-in for {}", user_id);
        Ok(stored)
    }
}
