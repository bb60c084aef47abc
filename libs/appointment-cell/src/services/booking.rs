use std::collections::HashMap;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use doctor_cell::DoctorDirectory;
use shared_config::AppConfig;
use shared_database::rest::{eq, in_list};
use shared_database::DatabaseClient;
use shared_models::auth::Role;

use crate::models::{
    Appointment, AppointmentError, AppointmentStatus, Decision, DoctorAppointment, DoctorSummary,
    PatientAppointment, PatientSummary,
};
use crate::services::lifecycle::AppointmentLifecycleService;

const APPOINTMENTS: &str = "appointments";
const USERS: &str = "users";

#[derive(Debug, Deserialize)]
struct StoredRole {
    #[serde(default)]
    role: Option<Role>,
}

pub struct BookingService {
    db: DatabaseClient,
    directory: DoctorDirectory,
}

impl BookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            db: DatabaseClient::new(config),
            directory: DoctorDirectory::new(config),
        }
    }

    /// Role as currently stored, which may differ from the one in the session token.
    pub async fn stored_role(&self, user_id: &str) -> Result<Option<Role>> {
        let row: Option<StoredRole> = self
            .db
            .select_one(USERS, &[("select", "role".to_string()), ("id", eq(user_id))])
            .await?;
        Ok(row.and_then(|r| r.role))
    }

    pub async fn create(
        &self,
        patient_id: &str,
        doctor_id: &str,
        deadline: DateTime<Utc>,
        notes: Option<String>,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Booking appointment with doctor {} for patient {}", doctor_id, patient_id);

        if self.directory.find(doctor_id).await?.is_none() {
            return Err(AppointmentError::DoctorNotFound);
        }

        let now = Utc::now();
        let appointment = Appointment {
            id: Uuid::new_v4().to_string(),
            patient_id: patient_id.to_string(),
            doctor_id: doctor_id.to_string(),
            requested_at: now,
            deadline,
            status: AppointmentStatus::Pending,
            scheduled_at: None,
            notes: notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
            created_at: now,
            updated_at: now,
        };

        let stored: Appointment = self.db.insert(APPOINTMENTS, &appointment).await?;
        info!("Appointment {} requested", stored.id);
        Ok(stored)
    }

    pub async fn find(&self, appointment_id: &str) -> Result<Option<Appointment>> {
        self.db
            .select_one(APPOINTMENTS, &[("id", eq(appointment_id))])
            .await
    }

    /// The patient's appointments, newest first. Appointments whose doctor is gone are omitted.
    pub async fn list_for_patient(&self, patient_id: &str) -> Result<Vec<PatientAppointment>> {
        let appointments = self.newest_first("patient_id", patient_id).await?;

        let doctor_ids = unique_ids(appointments.iter().map(|a| a.doctor_id.as_str()));
        let doctors: HashMap<String, DoctorSummary> = self
            .directory
            .find_many(&doctor_ids)
            .await?
            .into_iter()
            .map(|d| {
                let summary = DoctorSummary {
                    id: d.id.clone(),
                    name: d.name,
                    email: d.email,
                    specialization: d.specialization,
                    location: d.location,
                    profile_picture: d.profile_picture,
                };
                (d.id, summary)
            })
            .collect();

        Ok(appointments
            .into_iter()
            .filter_map(|a| {
                let doctor = doctors.get(&a.doctor_id)?.clone();
                Some(PatientAppointment {
                    id: a.id,
                    status: a.status,
                    deadline: a.deadline,
                    scheduled_at: a.scheduled_at,
                    requested_at: a.requested_at,
                    notes: a.notes,
                    doctor,
                })
            })
            .collect())
    }

    /// Appointments assigned to the doctor, newest first, with patient contact details.
    pub async fn list_for_doctor(&self, doctor_id: &str) -> Result<Vec<DoctorAppointment>> {
        let appointments = self.newest_first("doctor_id", doctor_id).await?;

        let patient_ids = unique_ids(appointments.iter().map(|a| a.patient_id.as_str()));
        let patients: HashMap<String, PatientSummary> = if patient_ids.is_empty() {
            HashMap::new()
        } else {
            self.db
                .select::<PatientSummary>(
                    USERS,
                    &[("select", "id,name,email".to_string()), ("id", in_list(&patient_ids))],
                )
                .await?
                .into_iter()
                .map(|p| (p.id.clone(), p))
                .collect()
        };

        Ok(appointments
            .into_iter()
            .filter_map(|a| {
                let patient = patients.get(&a.patient_id)?.clone();
                Some(DoctorAppointment {
                    id: a.id,
                    status: a.status,
                    deadline: a.deadline,
                    scheduled_at: a.scheduled_at,
                    requested_at: a.requested_at,
                    notes: a.notes,
                    patient,
                })
            })
            .collect())
    }

    /// Apply a doctor's decision to one of their pending appointments.
    pub async fn decide(
        &self,
        doctor_id: &str,
        appointment_id: &str,
        decision: Decision,
    ) -> Result<(), AppointmentError> {
        let appointment = self
            .find(appointment_id)
            .await?
            .filter(|a| a.doctor_id == doctor_id)
            .ok_or(AppointmentError::NotFound)?;

        let change = AppointmentLifecycleService::apply(&appointment, decision)?;

        // Guarded on status so a concurrent decision cannot be overwritten.
        let updated = self
            .db
            .update(
                APPOINTMENTS,
                &[
                    ("id", eq(appointment_id)),
                    ("status", eq(AppointmentStatus::Pending)),
                ],
                json!({
                    "status": change.status,
                    "scheduled_at": change.scheduled_at,
                    "updated_at": Utc::now(),
                }),
            )
            .await?;

        if updated.is_empty() {
            let current = self.find(appointment_id).await?.ok_or(AppointmentError::NotFound)?;
            return Err(AppointmentError::InvalidStatusTransition(current.status));
        }

        info!("Appointment {} is now {}", appointment_id, change.status);
        Ok(())
    }

    async fn newest_first(&self, column: &str, user_id: &str) -> Result<Vec<Appointment>> {
        self.db
            .select(
                APPOINTMENTS,
                &[(column, eq(user_id)), ("order", "created_at.desc".to_string())],
            )
            .await
    }
}

fn unique_ids<'a>(ids: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for id in ids {
        if !out.iter().any(|existing| existing == id) {
            out.push(id.to_string());
        }
    }
    out
}
