use axum::http::{header::SET_COOKIE, HeaderMap, HeaderValue};
use axum_extra::extract::cookie::CookieJar;

use shared_config::AppConfig;
use shared_models::auth::{LEGACY_SESSION_COOKIE, SESSION_COOKIE};

/// `Set-Cookie` value carrying a session token.
pub fn session_cookie(token: &str, config: &AppConfig) -> String {
    let max_age = config.session_ttl_hours.max(0).saturating_mul(60 * 60);
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, token, max_age
    );
    if config.secure_cookies {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` values that clear both the current and the legacy session cookie.
pub fn expired_session_cookies() -> Vec<String> {
    [SESSION_COOKIE, LEGACY_SESSION_COOKIE]
        .iter()
        .map(|name| {
            format!(
                "{}=; Path=/; HttpOnly; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT",
                name
            )
        })
        .collect()
}

/// Headers map with one `Set-Cookie` entry per value. Values that are not valid
/// header text are skipped.
pub fn set_cookie_headers<I>(cookies: I) -> HeaderMap
where
    I: IntoIterator<Item = String>,
{
    let mut headers = HeaderMap::new();
    for cookie in cookies {
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            headers.append(SET_COOKIE, value);
        }
    }
    headers
}

/// Session token from the `auth_session` cookie, if present.
pub fn session_token_from_cookies(headers: &HeaderMap) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}
