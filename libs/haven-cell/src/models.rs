use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ==============================================================================
// COMPANION CHAT
// ==============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HavenChatRequest {
    #[serde(default)]
    pub contents: Value,
    /// Voice emotion label for the latest user turn, if the client has one.
    #[serde(default)]
    pub emotion: Option<String>,
}

// ==============================================================================
// VOICE EMOTION
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Happy,
    Sad,
    Angry,
    Engaged,
    Calm,
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Angry => "angry",
            Emotion::Engaged => "engaged",
            Emotion::Calm => "calm",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PitchEstimate {
    pub f0: f32,
    pub rms: f32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionRequest {
    pub sample_rate: f32,
    #[serde(default)]
    pub frames: Vec<Vec<f32>>,
    pub calibration_frames: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionReport {
    pub emotion: Emotion,
    pub calibrated: bool,
    pub speech_detected: bool,
    pub frames_analyzed: usize,
    pub last_pitch_hz: f32,
    pub last_rms: f32,
}

// ==============================================================================
// WELLBEING
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WellbeingMetrics {
    pub overall_score: i32,
    pub stress: i32,
    pub anxiety: i32,
    pub mood: i32,
    pub sleep: i32,
    pub trend: &'static str,
    pub recent_sessions_count: usize,
}

/// A row of the `mental_health_records` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MentalHealthRecord {
    pub id: String,
    pub user_id: String,
    pub mood: i32,
    pub stress: i32,
    pub anxiety: i32,
    pub sleep: i32,
    #[serde(default)]
    pub notes: Option<String>,
    pub recorded_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MentalHealthCheckIn {
    pub mood: i32,
    pub stress: i32,
    pub anxiety: i32,
    pub sleep: i32,
    pub notes: Option<String>,
}

impl MentalHealthCheckIn {
    /// Name of the first score outside `0..=100`.
    pub fn out_of_range(&self) -> Option<&'static str> {
        [
            ("mood", self.mood),
            ("stress", self.stress),
            ("anxiety", self.anxiety),
            ("sleep", self.sleep),
        ]
        .into_iter()
        .find(|(_, score)| !(0..=100).contains(score))
        .map(|(name, _)| name)
    }
}
