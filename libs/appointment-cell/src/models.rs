use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_models::error::AppError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Approved,
    Rejected,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "pending"),
            AppointmentStatus::Approved => write!(f, "approved"),
            AppointmentStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// A row of the `appointments` collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: String,
    pub patient_id: String,
    pub doctor_id: String,
    pub requested_at: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentView {
    pub id: String,
    pub patient_id: String,
    pub doctor_id: String,
    pub requested_at: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Appointment> for AppointmentView {
    fn from(a: Appointment) -> Self {
        Self {
            id: a.id,
            patient_id: a.patient_id,
            doctor_id: a.doctor_id,
            requested_at: a.requested_at,
            deadline: a.deadline,
            status: a.status,
            scheduled_at: a.scheduled_at,
            notes: a.notes,
            created_at: a.created_at,
        }
    }
}

// ==============================================================================
// JOINED LISTINGS
// ==============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub specialization: Option<String>,
    pub location: Option<String>,
    pub profile_picture: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientSummary {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Appointment as listed to its patient, with the doctor's public fields.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientAppointment {
    #[serde(rename = "_id")]
    pub id: String,
    pub status: AppointmentStatus,
    pub deadline: DateTime<Utc>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub requested_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub doctor: DoctorSummary,
}

/// Appointment as listed to its doctor.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorAppointment {
    #[serde(rename = "_id")]
    pub id: String,
    pub status: AppointmentStatus,
    pub deadline: DateTime<Utc>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub requested_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub patient: PatientSummary,
}

// ==============================================================================
// REQUESTS
// ==============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentRequest {
    pub doctor_id: Option<String>,
    pub deadline: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRequest {
    pub appointment_id: Option<String>,
    pub action: Option<String>,
    pub scheduled_at: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve { scheduled_at: DateTime<Utc> },
    Reject,
}

impl Decision {
    pub fn target_status(&self) -> AppointmentStatus {
        match self {
            Decision::Approve { .. } => AppointmentStatus::Approved,
            Decision::Reject => AppointmentStatus::Rejected,
        }
    }
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Only patients can book or list their appointments")]
    NotPatient,

    #[error("Forbidden")]
    NotDoctor,

    #[error("Appointment has already been {0}")]
    InvalidStatusTransition(AppointmentStatus),

    #[error("{0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<anyhow::Error> for AppointmentError {
    fn from(err: anyhow::Error) -> Self {
        AppointmentError::DatabaseError(err.to_string())
    }
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::NotFound | AppointmentError::DoctorNotFound => {
                AppError::NotFound(err.to_string())
            }
            AppointmentError::NotPatient | AppointmentError::NotDoctor => {
                AppError::Forbidden(err.to_string())
            }
            AppointmentError::InvalidStatusTransition(_) => AppError::Conflict(err.to_string()),
            AppointmentError::ValidationError(msg) => AppError::ValidationError(msg),
            AppointmentError::DatabaseError(msg) => {
                tracing::error!("Appointment store failure: {}", msg);
                AppError::Database("Failed to access appointments".to_string())
            }
        }
    }
}
