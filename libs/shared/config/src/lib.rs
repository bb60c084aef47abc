use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_service_key: String,
    pub jwt_secret: String,
    pub session_ttl_hours: i64,
    pub secure_cookies: bool,
    pub gemini_api_key: String,
    pub gemini_base_url: String,
    pub gemini_chat_model: String,
    pub gemini_vision_model: String,
    pub huggingface_api_key: String,
    pub huggingface_base_url: String,
    pub overpass_url: String,
    pub port: u16,
}

const DEFAULT_SESSION_TTL_HOURS: i64 = 24 * 7;
/// Upper bound on session lifetime. Keeps expiry and cookie `Max-Age` arithmetic in range.
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;
const DEFAULT_PORT: u16 = 3000;

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            database_url: required("DATABASE_URL"),
            database_service_key: required("DATABASE_SERVICE_KEY"),
            jwt_secret: required("JWT_SECRET"),
            session_ttl_hours: session_ttl_hours(env::var("SESSION_TTL_HOURS").ok().as_deref()),
            secure_cookies: env::var("SECURE_COOKIES")
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            gemini_api_key: required("GEMINI_API_KEY"),
            gemini_base_url: with_default(
                "GEMINI_BASE_URL",
                "https://generativelanguage.googleapis.com/v1beta",
            ),
            gemini_chat_model: with_default("GEMINI_CHAT_MODEL", "gemini-2.5-flash"),
            gemini_vision_model: with_default("GEMINI_VISION_MODEL", "gemini-1.5-flash"),
            huggingface_api_key: required("HUGGINGFACE_API_KEY"),
            huggingface_base_url: with_default(
                "HUGGINGFACE_BASE_URL",
                "https://api-inference.huggingface.co/models",
            ),
            overpass_url: with_default("OVERPASS_URL", "https://overpass-api.de/api/interpreter"),
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_PORT),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }
        if !config.is_ai_configured() {
            warn!("GEMINI_API_KEY not set, AI chat and vision analysis will fail");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.database_url.is_empty()
            && !self.database_service_key.is_empty()
            && !self.jwt_secret.is_empty()
    }

    pub fn is_ai_configured(&self) -> bool {
        !self.gemini_api_key.is_empty()
    }
}

fn session_ttl_hours(raw: Option<&str>) -> i64 {
    let hours = raw
        .and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|hours| *hours > 0)
        .unwrap_or(DEFAULT_SESSION_TTL_HOURS);

    if hours > MAX_SESSION_TTL_HOURS {
        warn!(
            "SESSION_TTL_HOURS={} exceeds the maximum, using {}",
            hours, MAX_SESSION_TTL_HOURS
        );
        return MAX_SESSION_TTL_HOURS;
    }
    hours
}

fn required(name: &str) -> String {
    env::var(name).unwrap_or_else(|_| {
        warn!("{} not set, using empty value", name);
        String::new()
    })
}

fn with_default(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| {
        warn!("{} not set, using default", name);
        default.to_string()
    })
}
