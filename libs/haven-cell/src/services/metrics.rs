use anyhow::Result;
use chrono::{Duration, Utc};
use tracing::debug;

use chat_cell::{ChatHistoryService, ChatSessionRecord, Severity};
use shared_config::AppConfig;

use crate::models::WellbeingMetrics;

const LOOKBACK_DAYS: i64 = 7;
const MENTAL_HEALTH_CATEGORY: &str = "Mental Health";
const MENTAL_HEALTH_SYMPTOMS: [&str; 4] = ["anxiety", "stress", "depression", "insomnia"];

fn is_mental_health(session: &ChatSessionRecord) -> bool {
    session.category.as_deref() == Some(MENTAL_HEALTH_CATEGORY)
        || session
            .symptoms
            .iter()
            .any(|s| MENTAL_HEALTH_SYMPTOMS.contains(&s.to_lowercase().as_str()))
}

fn trend(overall: i32) -> &'static str {
    if overall > 75 {
        "+5% this week"
    } else if overall > 50 {
        "Stable"
    } else {
        "-3% this week"
    }
}

/// Score a week of chat sessions. Every metric is clamped to 0..=100.
pub fn wellbeing_metrics(sessions: &[ChatSessionRecord]) -> WellbeingMetrics {
    let count = |severity: Severity| {
        sessions
            .iter()
            .filter(|s| s.severity == Some(severity))
            .count() as i32
    };
    let severe = count(Severity::Severe);
    let moderate = count(Severity::Moderate);
    let mental = sessions.iter().filter(|s| is_mental_health(s)).count() as i32;

    let overall_score = (80 - (severe * 15 + moderate * 8)).clamp(0, 100);

    WellbeingMetrics {
        overall_score,
        stress: (30 + severe * 20 + moderate * 10).clamp(0, 100),
        anxiety: (25 + severe * 15 + moderate * 8).clamp(0, 100),
        mood: (85 - mental * 10).clamp(0, 100),
        sleep: (75 - mental * 8).clamp(0, 100),
        trend: trend(overall_score),
        recent_sessions_count: sessions.len(),
    }
}

pub struct WellbeingService {
    history: ChatHistoryService,
}

impl WellbeingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            history: ChatHistoryService::new(config),
        }
    }

    pub async fn weekly(&self, user_id: &str) -> Result<WellbeingMetrics> {
        let since = Utc::now() - Duration::days(LOOKBACK_DAYS);
        let sessions = self.history.since(user_id, since).await?;
        debug!("Scoring {} chat session(s) for {}", sessions.len(), user_id);
        Ok(wellbeing_metrics(&sessions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(severity: Option<Severity>, category: &str, symptoms: &[&str]) -> ChatSessionRecord {
        let now = Utc::now();
        ChatSessionRecord {
            id: "s".to_string(),
            user_id: "u".to_string(),
            symptoms: symptoms.iter().map(|s| s.to_string()).collect(),
            category: Some(category.to_string()),
            severity,
            summary: None,
            recommendations: vec![],
            source: None,
            messages_count: None,
            visit_duration_ms: None,
            visit_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_quiet_week_uses_baseline() {
        let metrics = wellbeing_metrics(&[]);
        assert_eq!(metrics.overall_score, 80);
        assert_eq!(metrics.stress, 30);
        assert_eq!(metrics.anxiety, 25);
        assert_eq!(metrics.mood, 85);
        assert_eq!(metrics.sleep, 75);
        assert_eq!(metrics.trend, "+5% this week");
        assert_eq!(metrics.recent_sessions_count, 0);
    }

    #[test]
    fn test_severity_and_mental_health_sessions() {
        let sessions = vec![
            session(Some(Severity::Severe), "General", &["pain"]),
            session(Some(Severity::Moderate), "Mental Health", &[]),
            session(Some(Severity::Mild), "General", &["Insomnia"]),
        ];

        let metrics = wellbeing_metrics(&sessions);
        assert_eq!(metrics.overall_score, 57);
        assert_eq!(metrics.stress, 60);
        assert_eq!(metrics.anxiety, 48);
        assert_eq!(metrics.mood, 65);
        assert_eq!(metrics.sleep, 59);
        assert_eq!(metrics.trend, "Stable");
        assert_eq!(metrics.recent_sessions_count, 3);
    }

    #[test]
    fn test_scores_are_clamped() {
        let sessions: Vec<_> = (0..8)
            .map(|_| session(Some(Severity::Severe), "Mental Health", &["stress"]))
            .collect();

        let metrics = wellbeing_metrics(&sessions);
        assert_eq!(metrics.overall_score, 0);
        assert_eq!(metrics.stress, 100);
        assert_eq!(metrics.anxiety, 100);
        assert_eq!(metrics.mood, 5);
        assert_eq!(metrics.sleep, 11);
        assert_eq!(metrics.trend, "-3% this week");
    }
}
