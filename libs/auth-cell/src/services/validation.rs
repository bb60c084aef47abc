use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::warn;

use shared_models::auth::Role;

use crate::models::{SignupRequest, ValidatedSignup};

pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MIN_NAME_LENGTH: usize = 2;

static EMAIL_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok());

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN
        .as_ref()
        .map(|re| re.is_match(email))
        .unwrap_or(false)
}

/// Check a signup form and normalize it. The error is the message shown to the user.
pub fn validate_signup(request: &SignupRequest) -> Result<ValidatedSignup, String> {
    let name = request.name.as_deref().unwrap_or("").trim().to_string();
    if name.chars().count() < MIN_NAME_LENGTH {
        return Err("Name must be at least 2 characters".to_string());
    }

    let email = normalize_email(request.email.as_deref().unwrap_or(""));
    if !is_valid_email(&email) {
        return Err("Please provide a valid email address".to_string());
    }

    let password = request.password.clone().unwrap_or_default();
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err("Password must be at least 6 characters".to_string());
    }

    let role: Role = request
        .role
        .as_deref()
        .unwrap_or("")
        .trim()
        .to_lowercase()
        .parse()
        .map_err(|_| "Role must be either doctor or patient".to_string())?;

    let location = request.location.as_deref().unwrap_or("").trim().to_string();
    if location.is_empty() {
        return Err("Location is required".to_string());
    }

    let (specialization, experience) = match role {
        Role::Doctor => {
            let specialization = request
                .specialization
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| "Specialization is required for doctors".to_string())?;
            let experience = parse_experience(request.experience.as_ref())
                .ok_or_else(|| "Experience must be a non-negative number".to_string())?;
            (Some(specialization.to_string()), experience)
        }
        Role::Patient => (None, 0.0),
    };

    Ok(ValidatedSignup {
        name,
        email,
        password,
        role,
        location,
        specialization,
        experience,
        achievements: parse_achievements(request.achievements.as_ref()),
        profile_picture: request
            .profile_picture
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string),
    })
}

/// Years of experience from a number or numeric string. Absent counts as 0.
pub fn parse_experience(value: Option<&Value>) -> Option<f64> {
    let years = match value {
        None | Some(Value::Null) => 0.0,
        Some(Value::Number(n)) => n.as_f64()?,
        Some(Value::String(s)) if s.trim().is_empty() => 0.0,
        Some(Value::String(s)) => s.trim().parse::<f64>().ok()?,
        Some(other) => {
            warn!("Unsupported experience value: {}", other);
            return None;
        }
    };

    (years.is_finite() && years >= 0.0).then_some(years)
}

pub fn parse_achievements(value: Option<&Value>) -> Vec<String> {
    let items: Vec<String> = match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) => s.split(['\n', ',']).map(str::to_string).collect(),
        _ => Vec::new(),
    };

    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
