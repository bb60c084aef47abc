use anyhow::{anyhow, Result};
use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

use shared_config::AppConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: String,
    pub score: f64,
}

/// Non-2xx reply from the inference API, kept so callers can pass the status through.
#[derive(Debug, Error)]
#[error("Analysis failed: {status}")]
pub struct UpstreamStatus {
    pub status: StatusCode,
    pub body: String,
}

pub struct HuggingFaceClient {
    http_client: Client,
    api_key: String,
    base_url: String,
}

impl HuggingFaceClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            http_client: Client::new(),
            api_key: config.huggingface_api_key.clone(),
            base_url: config.huggingface_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn classify(&self, model_id: &str, image: &[u8]) -> Result<Vec<Classification>> {
        let url = format!("{}/{}", self.base_url, model_id);
        debug!("Calling inference model {}", model_id);

        let response = self
            .http_client
            .post(&url)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(header::CONTENT_TYPE, "application/octet-stream")
            .body(image.to_vec())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            error!("Inference API error ({}): {}", status, body);
            return Err(UpstreamStatus { status, body }.into());
        }

        let payload: Value = response.json().await?;
        normalize_classifications(&payload)
            .ok_or_else(|| anyhow!("Unexpected response format from AI model"))
    }
}

/// Accepts either a list of `{label|class, score|confidence}` or a single such object.
pub fn normalize_classifications(payload: &Value) -> Option<Vec<Classification>> {
    match payload {
        Value::Array(items) => Some(items.iter().map(to_classification).collect()),
        Value::Object(obj) if obj.contains_key("label") || obj.contains_key("class") => {
            Some(vec![to_classification(payload)])
        }
        _ => None,
    }
}

fn to_classification(item: &Value) -> Classification {
    let label = item["label"]
        .as_str()
        .or_else(|| item["class"].as_str())
        .unwrap_or("Unknown")
        .to_string();
    let score = item["score"]
        .as_f64()
        .or_else(|| item["confidence"].as_f64())
        .unwrap_or(0.0);

    Classification { label, score }
}
