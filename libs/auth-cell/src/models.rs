use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use shared_models::auth::{Role, User};

// ==============================================================================
// STORED DOCUMENTS
// ==============================================================================

/// Feature progress counters kept on every account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageProgress {
    #[serde(default)]
    pub ai_chat: u32,
    #[serde(default)]
    pub vision_analysis: u32,
    #[serde(default)]
    pub image_detection: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageStats {
    #[serde(default)]
    pub total_chats_started: u32,
    #[serde(default)]
    pub total_images_analyzed: u32,
    #[serde(default)]
    pub total_time_spent: u64,
    #[serde(default)]
    pub features_used: u32,
}

/// A row of the `users` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub specialization: Option<String>,
    #[serde(default)]
    pub experience: Option<f64>,
    #[serde(default)]
    pub achievements: Option<Vec<String>>,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub progress: UsageProgress,
    #[serde(default)]
    pub stats: UsageStats,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
}

impl UserRecord {
    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role,
        }
    }

    pub fn public_view(&self) -> SessionUser {
        SessionUser {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            location: self.location.clone(),
            specialization: self.specialization.clone(),
            experience: self.experience,
            achievements: self.achievements.clone().unwrap_or_default(),
            profile_picture: self.profile_picture.clone(),
            created_at: self.created_at,
        }
    }
}

/// Insert body for a new account.
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub location: String,
    pub specialization: Option<String>,
    pub experience: f64,
    pub achievements: Vec<String>,
    pub profile_picture: Option<String>,
    pub progress: UsageProgress,
    pub stats: UsageStats,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

// ==============================================================================
// WIRE TYPES
// ==============================================================================

/// Account view returned to the browser. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Option<Role>,
    pub location: Option<String>,
    pub specialization: Option<String>,
    pub experience: Option<f64>,
    pub achievements: Vec<String>,
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields are optional so that missing input is reported as a validation
/// failure rather than a JSON rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub location: Option<String>,
    pub specialization: Option<String>,
    /// Number or numeric string.
    pub experience: Option<Value>,
    /// Array of strings, or one string separated by newlines or commas.
    pub achievements: Option<Value>,
    pub profile_picture: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credentials {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl Credentials {
    /// Both fields, if present and non-blank.
    pub fn pair(&self) -> Option<(&str, &str)> {
        let email = self.email.as_deref().map(str::trim).filter(|e| !e.is_empty())?;
        let password = self.password.as_deref().filter(|p| !p.is_empty())?;
        Some((email, password))
    }
}

/// Signup input after validation and normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSignup {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub location: String,
    pub specialization: Option<String>,
    pub experience: f64,
    pub achievements: Vec<String>,
    pub profile_picture: Option<String>,
}
