use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::{debug, warn};

use shared_config::AppConfig;
use shared_models::auth::{Role, User};
use shared_models::error::AppError;
use shared_models::response::success;

use crate::models::{AppointmentError, AppointmentView, CreateAppointmentRequest, DecisionRequest};
use crate::services::{AppointmentLifecycleService, BookingService};

fn require_patient(user: &User) -> Result<(), AppointmentError> {
    if user.may_act_as_patient() {
        Ok(())
    } else {
        warn!("User {} with role {:?} tried a patient route", user.id, user.role);
        Err(AppointmentError::NotPatient)
    }
}

/// Doctor routes trust the stored role, not the one baked into the token.
async fn require_doctor(booking: &BookingService, user: &User) -> Result<(), AppointmentError> {
    match booking.stored_role(&user.id).await? {
        Some(Role::Doctor) => Ok(()),
        _ => {
            warn!("User {} is not a doctor", user.id);
            Err(AppointmentError::NotDoctor)
        }
    }
}

// ==============================================================================
// PATIENT HANDLERS
// ==============================================================================

pub async fn list_patient_appointments(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_patient(&user)?;
    debug!("Listing appointments for patient {}", user.id);

    let appointments = BookingService::new(&state)
        .list_for_patient(&user.id)
        .await
        .map_err(AppointmentError::from)?;

    Ok(Json(success(json!({ "appointments": appointments }))))
}

pub async fn create_appointment(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    require_patient(&user)?;

    let doctor_id = request.doctor_id.as_deref().map(str::trim).filter(|d| !d.is_empty());
    let (Some(doctor_id), Some(deadline)) = (doctor_id, request.deadline.as_deref()) else {
        return Err(AppError::ValidationError("doctorId and deadline are required".to_string()));
    };
    let deadline = AppointmentLifecycleService::validate_deadline(deadline, Utc::now())?;

    let appointment = BookingService::new(&state)
        .create(&user.id, doctor_id, deadline, request.notes)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(success(json!({ "appointment": AppointmentView::from(appointment) }))),
    ))
}

// ==============================================================================
// DOCTOR HANDLERS
// ==============================================================================

pub async fn list_doctor_appointments(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let booking = BookingService::new(&state);
    require_doctor(&booking, &user).await?;

    let appointments = booking
        .list_for_doctor(&user.id)
        .await
        .map_err(AppointmentError::from)?;

    Ok(Json(success(json!({ "appointments": appointments }))))
}

pub async fn decide_appointment(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(request): Json<DecisionRequest>,
) -> Result<Json<Value>, AppError> {
    let booking = BookingService::new(&state);
    require_doctor(&booking, &user).await?;

    let (appointment_id, decision) = AppointmentLifecycleService::parse_decision(&request)?;
    booking.decide(&user.id, &appointment_id, decision).await?;

    Ok(Json(json!({ "success": true })))
}
