use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::models::{Appointment, AppointmentError, AppointmentStatus, Decision, DecisionRequest};

/// Fields written when a decision is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
    pub status: AppointmentStatus,
    pub scheduled_at: Option<DateTime<Utc>>,
}

pub struct AppointmentLifecycleService;

impl AppointmentLifecycleService {
    /// Statuses reachable from `current`. Approved and rejected are terminal.
    pub fn valid_transitions(current: AppointmentStatus) -> &'static [AppointmentStatus] {
        match current {
            AppointmentStatus::Pending => &[AppointmentStatus::Approved, AppointmentStatus::Rejected],
            AppointmentStatus::Approved | AppointmentStatus::Rejected => &[],
        }
    }

    pub fn apply(appointment: &Appointment, decision: Decision) -> Result<StatusChange, AppointmentError> {
        let target = decision.target_status();
        debug!("Transition {} -> {} for {}", appointment.status, target, appointment.id);

        if !Self::valid_transitions(appointment.status).contains(&target) {
            warn!(
                "Invalid status transition attempted: {} -> {}",
                appointment.status, target
            );
            return Err(AppointmentError::InvalidStatusTransition(appointment.status));
        }

        Ok(match decision {
            Decision::Approve { scheduled_at } => StatusChange {
                status: target,
                scheduled_at: Some(scheduled_at),
            },
            Decision::Reject => StatusChange {
                status: target,
                scheduled_at: None,
            },
        })
    }

    /// Parse a doctor's decision. Returns the appointment id with it.
    pub fn parse_decision(request: &DecisionRequest) -> Result<(String, Decision), AppointmentError> {
        let appointment_id = request
            .appointment_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty());

        let (Some(appointment_id), Some(action)) = (appointment_id, request.action.as_deref()) else {
            return Err(AppointmentError::ValidationError(
                "appointmentId and valid action required".to_string(),
            ));
        };

        let decision = match action {
            "approve" => {
                let raw = request
                    .scheduled_at
                    .as_deref()
                    .filter(|s| !s.trim().is_empty())
                    .ok_or_else(|| {
                        AppointmentError::ValidationError("scheduledAt required when approving".to_string())
                    })?;
                Decision::Approve {
                    scheduled_at: parse_timestamp(raw, "scheduledAt")?,
                }
            }
            "reject" => Decision::Reject,
            _ => {
                return Err(AppointmentError::ValidationError(
                    "appointmentId and valid action required".to_string(),
                ))
            }
        };

        Ok((appointment_id.to_string(), decision))
    }

    /// A booking deadline must lie in the future.
    pub fn validate_deadline(raw: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, AppointmentError> {
        let deadline = parse_timestamp(raw, "deadline")?;
        if deadline <= now {
            return Err(AppointmentError::ValidationError(
                "deadline must be in the future".to_string(),
            ));
        }
        Ok(deadline)
    }
}

fn parse_timestamp(raw: &str, field: &str) -> Result<DateTime<Utc>, AppointmentError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| AppointmentError::ValidationError(format!("{} must be an RFC 3339 timestamp", field)))
}
