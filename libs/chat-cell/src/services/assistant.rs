use anyhow::Result;
use tracing::debug;

use shared_ai::{ChatContent, GeminiClient};
use shared_config::AppConfig;

pub const MEDICAL_ASSISTANT_PROMPT: &str = "You are Synaptix AI, a helpful medical assistant. \
Provide accurate, helpful medical information while always recommending users consult with \
healthcare professionals for serious concerns. Be empathetic and professional in your responses. \
IMPORTANT: Format your responses using proper markdown syntax:\n\n\
- Use # for main headings (largest)\n\
- Use ## for section headings (medium)\n\
- Use ### for subsections (smaller)\n\
- Use **bold text** for emphasis\n\
- Use - or * for bullet points in lists\n\
- Use 1. 2. 3. for numbered lists\n\n\
Always structure your responses with clear headings and organized lists to make medical \
information easy to read and understand.";

pub struct AssistantService {
    gemini: GeminiClient,
}

impl AssistantService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            gemini: GeminiClient::chat(config),
        }
    }

    pub async fn reply(&self, contents: &[ChatContent]) -> Result<String> {
        debug!("Medical assistant reply for {} turn(s)", contents.len());
        self.gemini.generate(MEDICAL_ASSISTANT_PROMPT, contents).await
    }
}
