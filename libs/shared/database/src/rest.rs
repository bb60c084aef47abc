use anyhow::{anyhow, Context, Result};
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_RANGE, CONTENT_TYPE},
    Client, Method, Response, StatusCode,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

use shared_config::AppConfig;

/// Non-2xx reply from the store. Callers downcast to react to specific statuses.
#[derive(Debug, Error)]
#[error("{}: {body}", describe(.status))]
pub struct StoreStatus {
    pub status: StatusCode,
    pub body: String,
}

fn describe(status: &StatusCode) -> String {
    match status.as_u16() {
        401 | 403 => "Authentication error".to_string(),
        404 => "Resource not found".to_string(),
        409 => "Conflict".to_string(),
        _ => format!("API error ({})", status),
    }
}

/// True when the store rejected the write with 409, e.g. a unique constraint.
pub fn is_conflict(err: &anyhow::Error) -> bool {
    err.downcast_ref::<StoreStatus>()
        .is_some_and(|e| e.status == StatusCode::CONFLICT)
}

/// Client for the PostgREST-style document store. Every collection lives under
/// `/rest/v1/{collection}` and is filtered with query parameters such as
/// `email=eq.a@b.com` or `order=created_at.desc`.
#[derive(Clone)]
pub struct DatabaseClient {
    client: Client,
    base_url: String,
    service_key: String,
}

pub type Query<'a> = [(&'a str, String)];

impl DatabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.database_url.trim_end_matches('/').to_string(),
            service_key: config.database_service_key.clone(),
        }
    }

    fn get_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        headers.insert("apikey", HeaderValue::from_str(&self.service_key)?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.service_key))?,
        );

        Ok(headers)
    }

    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        query: &Query<'_>,
        body: Option<Value>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = self.send(method, path, query, body, extra_headers).await?;
        let data = response.json::<T>().await?;
        Ok(data)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &Query<'_>,
        body: Option<Value>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<Response> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut headers = self.get_headers()?;
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url).headers(headers);

        if !query.is_empty() {
            req = req.query(query);
        }

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            error!("Database error ({}): {}", status, body);
            return Err(StoreStatus { status, body }.into());
        }

        Ok(response)
    }

    pub async fn select<T>(&self, collection: &str, query: &Query<'_>) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let path = collection_path(collection);
        self.request(Method::GET, &path, query, None, None).await
    }

    pub async fn select_one<T>(&self, collection: &str, query: &Query<'_>) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let mut rows: Vec<T> = self.select(collection, query).await?;
        if rows.is_empty() {
            return Ok(None);
        }
        Ok(Some(rows.swap_remove(0)))
    }

    pub async fn insert<B, T>(&self, collection: &str, body: &B) -> Result<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let path = collection_path(collection);
        let payload = serde_json::to_value(body).context("Failed to serialize document")?;

        let mut rows: Vec<T> = self
            .request(
                Method::POST,
                &path,
                &[],
                Some(payload),
                Some(return_representation()),
            )
            .await?;

        if rows.is_empty() {
            return Err(anyhow!("Insert into {} returned no rows", collection));
        }
        Ok(rows.swap_remove(0))
    }

    pub async fn update(
        &self,
        collection: &str,
        query: &Query<'_>,
        body: Value,
    ) -> Result<Vec<Value>> {
        let path = collection_path(collection);
        self.request(
            Method::PATCH,
            &path,
            query,
            Some(body),
            Some(return_representation()),
        )
        .await
    }

    /// Row count from `Content-Range` without transferring any rows.
    pub async fn count(&self, collection: &str, query: &Query<'_>) -> Result<usize> {
        let path = collection_path(collection);
        let mut filters: Vec<(&str, String)> = query.to_vec();
        filters.push(("limit", "0".to_string()));

        let mut prefer = HeaderMap::new();
        prefer.insert("Prefer", HeaderValue::from_static("count=exact"));

        let response = self
            .send(Method::GET, &path, &filters, None, Some(prefer))
            .await?;

        let range = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| anyhow!("Count of {} returned no Content-Range", collection))?;
        parse_total(range).ok_or_else(|| anyhow!("Unexpected Content-Range: {}", range))
    }

    pub async fn ping(&self) -> Result<()> {
        let _: Value = self
            .request(Method::GET, "/rest/v1/", &[], None, None)
            .await?;
        Ok(())
    }
}

fn collection_path(collection: &str) -> String {
    format!("/rest/v1/{}", collection)
}

fn return_representation() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("Prefer", HeaderValue::from_static("return=representation"));
    headers
}

/// Total from a `Content-Range` value such as `*/42` or `0-9/42`.
fn parse_total(range: &str) -> Option<usize> {
    range.rsplit_once('/')?.1.trim().parse().ok()
}

/// `eq.` filter value.
pub fn eq(value: impl std::fmt::Display) -> String {
    format!("eq.{}", value)
}

/// Case-insensitive substring filter. PostgREST uses `*` as the wildcard in URLs.
pub fn ilike_contains(value: &str) -> String {
    let cleaned: String = value
        .chars()
        .filter(|c| !matches!(c, '*' | ',' | '(' | ')'))
        .collect();
    format!("ilike.*{}*", cleaned)
}

/// `in.(a,b,c)` filter value.
pub fn in_list<I, S>(values: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let joined = values
        .into_iter()
        .map(|v| v.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(",");
    format!("in.({})", joined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(uri: &str) -> AppConfig {
        AppConfig {
            database_url: uri.to_string(),
            database_service_key: "service-key".to_string(),
            jwt_secret: "secret".to_string(),
            session_ttl_hours: 1,
            secure_cookies: false,
            gemini_api_key: String::new(),
            gemini_base_url: String::new(),
            gemini_chat_model: String::new(),
            gemini_vision_model: String::new(),
            huggingface_api_key: String::new(),
            huggingface_base_url: String::new(),
            overpass_url: String::new(),
            port: 0,
        }
    }

    #[test]
    fn test_filter_helpers() {
        assert_eq!(eq("abc"), "eq.abc");
        assert_eq!(ilike_contains("Cardio"), "ilike.*Cardio*");
        assert_eq!(ilike_contains("a*b(c)"), "ilike.*abc*");
        assert_eq!(in_list(["a", "b"]), "in.(a,b)");
    }

    #[tokio::test]
    async fn test_select_sends_service_key_and_filters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/users"))
            .and(query_param("email", "eq.a@b.com"))
            .and(header("apikey", "service-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": "1" }])))
            .mount(&server)
            .await;

        let client = DatabaseClient::new(&config_for(&server.uri()));
        let row: Option<Value> = client
            .select_one("users", &[("email", eq("a@b.com"))])
            .await
            .unwrap();

        assert_eq!(row.unwrap()["id"], "1");
    }

    #[tokio::test]
    async fn test_error_status_becomes_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/users"))
            .respond_with(ResponseTemplate::new(401).set_body_string("nope"))
            .mount(&server)
            .await;

        let client = DatabaseClient::new(&config_for(&server.uri()));
        let err = client.select::<Value>("users", &[]).await.unwrap_err();
        assert!(err.to_string().starts_with("Authentication error"));
        assert!(!is_conflict(&err));
    }

    #[tokio::test]
    async fn test_unique_violation_is_conflict() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/users"))
            .respond_with(
                ResponseTemplate::new(409)
                    .set_body_json(json!({ "code": "23505", "message": "duplicate key" })),
            )
            .mount(&server)
            .await;

        let client = DatabaseClient::new(&config_for(&server.uri()));
        let err = client
            .insert::<_, Value>("users", &json!({ "id": "1" }))
            .await
            .unwrap_err();

        assert!(is_conflict(&err));
        assert!(err.to_string().starts_with("Conflict:"));
    }

    #[tokio::test]
    async fn test_count_reads_content_range() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/users"))
            .and(query_param("limit", "0"))
            .and(header("Prefer", "count=exact"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Range", "*/42")
                    .set_body_json(json!([])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = DatabaseClient::new(&config_for(&server.uri()));
        assert_eq!(client.count("users", &[]).await.unwrap(), 42);
    }

    #[test]
    fn test_parse_total() {
        assert_eq!(parse_total("*/42"), Some(42));
        assert_eq!(parse_total("0-9/120"), Some(120));
        assert_eq!(parse_total("0-9/*"), None);
    }

    #[tokio::test]
    async fn test_insert_with_empty_representation_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/users"))
            .and(header("Prefer", "return=representation"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
            .mount(&server)
            .await;

        let client = DatabaseClient::new(&config_for(&server.uri()));
        let result: Result<Value> = client.insert("users", &json!({ "id": "1" })).await;
        assert!(result.is_err());
    }
}
