use anyhow::{anyhow, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error};

use shared_config::AppConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatPart {
    pub text: String,
}

/// One conversation turn in Gemini's wire shape: `{ role, parts: [{ text }] }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatContent {
    pub role: String,
    pub parts: Vec<ChatPart>,
}

impl ChatContent {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new("user", text)
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self::new("model", text)
    }

    fn new(role: &str, text: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            parts: vec![ChatPart { text: text.into() }],
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == "user"
    }

    pub fn text(&self) -> String {
        self.parts
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub struct GeminiClient {
    http_client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(config: &AppConfig, model: &str) -> Self {
        Self {
            http_client: Client::new(),
            api_key: config.gemini_api_key.clone(),
            base_url: config.gemini_base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    pub fn chat(config: &AppConfig) -> Self {
        Self::new(config, &config.gemini_chat_model)
    }

    pub fn vision(config: &AppConfig) -> Self {
        Self::new(config, &config.gemini_vision_model)
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Run a conversation. The system prompt goes first as a `model` turn.
    pub async fn generate(&self, system_prompt: &str, contents: &[ChatContent]) -> Result<String> {
        let mut all_contents = Vec::with_capacity(contents.len() + 1);
        all_contents.push(ChatContent::model(system_prompt));
        all_contents.extend_from_slice(contents);

        self.generate_content(json!({ "contents": all_contents })).await
    }

    /// Single-turn prompt with an inline image.
    pub async fn generate_with_image(&self, prompt: &str, image: &[u8], mime_type: &str) -> Result<String> {
        let body = json!({
            "contents": [{
                "role": "user",
                "parts": [
                    { "text": prompt },
                    { "inlineData": { "mimeType": mime_type, "data": BASE64.encode(image) } }
                ]
            }]
        });

        self.generate_content(body).await
    }

    async fn generate_content(&self, body: Value) -> Result<String> {
        if !self.is_configured() {
            return Err(anyhow!("GEMINI_API_KEY is not configured."));
        }

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        debug!("Calling Gemini model {}", self.model);

        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            error!("Gemini API error ({}): {}", status, error_text);
            return Err(anyhow!("Gemini API error ({}): {}", status, error_text));
        }

        let reply: Value = response.json().await?;
        extract_text(&reply).ok_or_else(|| anyhow!("Invalid Gemini response format"))
    }
}

fn extract_text(reply: &Value) -> Option<String> {
    let parts = reply["candidates"][0]["content"]["parts"].as_array()?;
    let text: String = parts
        .iter()
        .filter_map(|p| p["text"].as_str())
        .collect::<Vec<_>>()
        .join("");

    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}
