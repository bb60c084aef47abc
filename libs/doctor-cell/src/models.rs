use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Public columns of a doctor's `users` row. The password hash is never selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorRecord {
    pub id: String,
    pub name: String,
    pub email: String,
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
    pub created_at: Option<DateTime<Utc>>,
}

pub const DOCTOR_COLUMNS: &str =
    "id,name,email,location,specialization,experience,achievements,profile_picture,created_at";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicDoctorProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub location: Option<String>,
    pub specialization: Option<String>,
    pub experience: Option<f64>,
    pub achievements: Option<Vec<String>>,
    pub profile_picture: Option<String>,
    pub status: &'static str,
}

impl From<DoctorRecord> for PublicDoctorProfile {
    fn from(record: DoctorRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            email: record.email,
            location: record.location,
            specialization: record.specialization,
            experience: record.experience,
            achievements: record.achievements,
            profile_picture: record.profile_picture,
            status: "active",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DoctorListQuery {
    pub specialization: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NearbyClinicsQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Clinic {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(rename = "type")]
    pub kind: String,
    pub distance_km: f64,
}
